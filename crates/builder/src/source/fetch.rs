//! Download and digest verification

use super::archive;
use ferrite_errors::{Error, SourceError};
use ferrite_events::{AppEvent, EventEmitter, SourceEvent};
use ferrite_manifest::SourceEntry;
use ferrite_recipe::RecipeContext;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Fetch a manifest source entry and unpack it into `dest`
///
/// Downloads the archive, verifies its sha256 against the manifest, unpacks
/// it, and optionally elides the single top-level directory.
///
/// # Errors
///
/// Returns `SourceError::FetchFailed` on network failure,
/// `SourceError::HashMismatch` when the digest differs, and an extraction
/// error when the archive cannot be unpacked.
pub async fn get(ctx: &RecipeContext, entry: &SourceEntry, dest: &Path) -> Result<(), Error> {
    let file_name = url_file_name(&entry.url);
    tokio::fs::create_dir_all(dest)
        .await
        .map_err(|e| Error::io_with_path(&e, dest))?;
    let archive_path = dest.join(format!(".fetch-{file_name}"));

    fetch_verified(ctx, &entry.url, &entry.sha256, &archive_path).await?;
    archive::unpack(&archive_path, dest, entry.strip_root).await?;
    tokio::fs::remove_file(&archive_path)
        .await
        .map_err(|e| Error::io_with_path(&e, &archive_path))?;

    ctx.emit(AppEvent::Source(SourceEvent::Unpacked {
        archive: file_name,
        dest: dest.to_path_buf(),
    }));
    Ok(())
}

/// Download a file and verify its digest without unpacking
///
/// # Errors
///
/// Returns `SourceError::FetchFailed` on network failure and
/// `SourceError::HashMismatch` when the digest differs.
pub async fn download(
    ctx: &RecipeContext,
    url: &str,
    sha256: &str,
    dest_file: &Path,
) -> Result<PathBuf, Error> {
    if let Some(parent) = dest_file.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::io_with_path(&e, parent))?;
    }
    fetch_verified(ctx, url, sha256, dest_file).await?;
    Ok(dest_file.to_path_buf())
}

async fn fetch_verified(
    ctx: &RecipeContext,
    url: &str,
    sha256: &str,
    dest: &Path,
) -> Result<(), Error> {
    ctx.emit(AppEvent::Source(SourceEvent::DownloadStarted {
        url: url.to_string(),
    }));

    let response = reqwest::get(url).await.map_err(|e| SourceError::FetchFailed {
        url: url.to_string(),
        message: e.to_string(),
    })?;
    if !response.status().is_success() {
        return Err(SourceError::FetchFailed {
            url: url.to_string(),
            message: format!("HTTP {}", response.status()),
        }
        .into());
    }
    let body = response.bytes().await.map_err(|e| SourceError::FetchFailed {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    let mut hasher = Sha256::new();
    hasher.update(&body);
    let actual = format!("{:x}", hasher.finalize());
    if !actual.eq_ignore_ascii_case(sha256) {
        return Err(SourceError::HashMismatch {
            file: url_file_name(url),
            expected: sha256.to_string(),
            actual,
        }
        .into());
    }

    tokio::fs::write(dest, &body)
        .await
        .map_err(|e| Error::io_with_path(&e, dest))?;

    ctx.emit(AppEvent::Source(SourceEvent::DownloadCompleted {
        url: url.to_string(),
        bytes: body.len() as u64,
    }));
    Ok(())
}

fn url_file_name(url: &str) -> String {
    url.rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("download")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_from_url() {
        assert_eq!(
            url_file_name("https://example.com/releases/v1.3.1/zlib-1.3.1.tar.gz"),
            "zlib-1.3.1.tar.gz"
        );
        assert_eq!(url_file_name("https://example.com/"), "download");
    }
}
