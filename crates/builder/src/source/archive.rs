//! Archive unpacking with optional top-level directory elision

use async_compression::tokio::bufread::{BzDecoder, GzipDecoder, XzDecoder};
use ferrite_errors::{Error, SourceError};
use std::io::Cursor;
use std::path::{Component, Path, PathBuf};
use tokio::io::{AsyncReadExt, BufReader};

/// Unpack a tar.gz / tar.xz / tar.bz2 / zip archive into `dest`
///
/// With `strip_root` the single top-level directory upstream archives wrap
/// their content in is elided.
///
/// # Errors
///
/// Returns `SourceError::UnsupportedArchiveFormat` for an unknown extension
/// and `SourceError::ExtractionFailed` when the archive is corrupt.
pub async fn unpack(archive: &Path, dest: &Path, strip_root: bool) -> Result<(), Error> {
    let file_name = archive
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    let data = tokio::fs::read(archive)
        .await
        .map_err(|e| Error::io_with_path(&e, archive))?;

    let tar_data = if file_name.ends_with(".zip") {
        return unpack_zip(data, dest.to_path_buf(), strip_root).await;
    } else if file_name.ends_with(".tar.gz") || file_name.ends_with(".tgz") {
        decompress(GzipDecoder::new(BufReader::new(data.as_slice()))).await?
    } else if file_name.ends_with(".tar.xz") || file_name.ends_with(".txz") {
        decompress(XzDecoder::new(BufReader::new(data.as_slice()))).await?
    } else if file_name.ends_with(".tar.bz2") || file_name.ends_with(".tbz2") {
        decompress(BzDecoder::new(BufReader::new(data.as_slice()))).await?
    } else if file_name.ends_with(".tar") {
        data
    } else {
        return Err(SourceError::UnsupportedArchiveFormat { filename: file_name }.into());
    };

    let dest = dest.to_path_buf();
    tokio::task::spawn_blocking(move || unpack_tar(&tar_data, &dest, strip_root))
        .await
        .map_err(|e| Error::internal(format!("unpack task: {e}")))?
}

async fn decompress<R>(mut decoder: R) -> Result<Vec<u8>, Error>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .await
        .map_err(|e| SourceError::ExtractionFailed {
            message: e.to_string(),
        })?;
    Ok(out)
}

fn unpack_tar(data: &[u8], dest: &Path, strip_root: bool) -> Result<(), Error> {
    let mut archive = tar::Archive::new(Cursor::new(data));
    let entries = archive.entries().map_err(extraction)?;
    for entry in entries {
        let mut entry = entry.map_err(extraction)?;
        let path = entry.path().map_err(extraction)?.into_owned();
        let Some(target) = strip(&path, strip_root) else {
            continue;
        };
        let target = dest.join(target);
        // Some archives carry no directory entries
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(extraction)?;
        }
        entry.unpack(&target).map_err(extraction)?;
    }
    Ok(())
}

async fn unpack_zip(data: Vec<u8>, dest: PathBuf, strip_root: bool) -> Result<(), Error> {
    tokio::task::spawn_blocking(move || {
        let mut zip = zip::ZipArchive::new(Cursor::new(data)).map_err(|e| {
            Error::from(SourceError::ExtractionFailed {
                message: e.to_string(),
            })
        })?;
        for index in 0..zip.len() {
            let mut file = zip.by_index(index).map_err(|e| {
                Error::from(SourceError::ExtractionFailed {
                    message: e.to_string(),
                })
            })?;
            let Some(enclosed) = file.enclosed_name() else {
                continue;
            };
            let Some(target) = strip(&enclosed, strip_root) else {
                continue;
            };
            let out_path = dest.join(target);
            if file.is_dir() {
                std::fs::create_dir_all(&out_path).map_err(|e| Error::io_with_path(&e, &out_path))?;
                continue;
            }
            if let Some(parent) = out_path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(&e, parent))?;
            }
            let mut out =
                std::fs::File::create(&out_path).map_err(|e| Error::io_with_path(&e, &out_path))?;
            std::io::copy(&mut file, &mut out).map_err(|e| Error::io_with_path(&e, &out_path))?;
        }
        Ok(())
    })
    .await
    .map_err(|e| Error::internal(format!("unpack task: {e}")))?
}

fn strip(path: &Path, strip_root: bool) -> Option<PathBuf> {
    let components: Vec<Component<'_>> = path
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect();
    let skip = usize::from(strip_root);
    if components.len() <= skip {
        return None;
    }
    Some(components[skip..].iter().collect())
}

fn extraction(e: std::io::Error) -> Error {
    SourceError::ExtractionFailed {
        message: e.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_tar(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut tar_data = Vec::new();
        {
            let mut builder = tar::Builder::new(&mut tar_data);
            for (path, contents) in entries {
                let mut header = tar::Header::new_gnu();
                header.set_size(contents.len() as u64);
                header.set_mode(0o644);
                header.set_cksum();
                builder
                    .append_data(&mut header, path, contents.as_bytes())
                    .unwrap();
            }
            builder.finish().unwrap();
        }
        tar_data
    }

    // gzip via the async encoder to avoid a flate2 dev-dependency
    async fn gzip(data: &[u8]) -> Vec<u8> {
        use async_compression::tokio::bufread::GzipEncoder;
        let mut encoder = GzipEncoder::new(BufReader::new(data));
        let mut out = Vec::new();
        encoder.read_to_end(&mut out).await.unwrap();
        out
    }

    #[tokio::test]
    async fn unpack_strips_single_root() {
        let dir = tempfile::tempdir().unwrap();
        let archive_path = dir.path().join("src.tar.gz");
        let tar_data = make_tar(&[
            ("pkg-1.0/README", "hello"),
            ("pkg-1.0/src/main.c", "int main(void) { return 0; }"),
        ]);
        let payload = gzip(&tar_data).await;
        tokio::fs::write(&archive_path, payload).await.unwrap();

        let dest = dir.path().join("out");
        unpack(&archive_path, &dest, true).await.unwrap();
        assert!(dest.join("README").is_file());
        assert!(dest.join("src/main.c").is_file());
        assert!(!dest.join("pkg-1.0").exists());
    }

    #[tokio::test]
    async fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let archive_path = dir.path().join("blob.rar");
        tokio::fs::write(&archive_path, b"data").await.unwrap();
        let err = unpack(&archive_path, dir.path(), false).await.unwrap_err();
        assert!(err.to_string().contains("unsupported archive format"));
    }
}
