//! In-place source edits

use ferrite_errors::{Error, SourceError};
use std::path::Path;

/// Replace a needle inside a text file
///
/// With `strict` the needle must be present; non-strict replacement of an
/// absent needle is a no-op so recipes can share edits across versions.
///
/// # Errors
///
/// Returns `SourceError::NeedleNotFound` in strict mode when the needle is
/// absent, and I/O errors from reading or writing the file.
pub async fn replace_in_file(
    path: &Path,
    needle: &str,
    replacement: &str,
    strict: bool,
) -> Result<(), Error> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::io_with_path(&e, path))?;
    if !contents.contains(needle) {
        if strict {
            return Err(SourceError::NeedleNotFound {
                file: path.display().to_string(),
                needle: needle.to_string(),
            }
            .into());
        }
        return Ok(());
    }
    let updated = contents.replace(needle, replacement);
    tokio::fs::write(path, updated)
        .await
        .map_err(|e| Error::io_with_path(&e, path))?;
    Ok(())
}

/// Write a file, creating parent directories; optionally append
///
/// # Errors
///
/// Returns I/O errors from creating directories or writing.
pub async fn save(path: &Path, contents: &str, append: bool) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::io_with_path(&e, parent))?;
    }
    if append && path.exists() {
        let mut existing = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::io_with_path(&e, path))?;
        existing.push_str(contents);
        tokio::fs::write(path, existing)
            .await
            .map_err(|e| Error::io_with_path(&e, path))?;
    } else {
        tokio::fs::write(path, contents)
            .await
            .map_err(|e| Error::io_with_path(&e, path))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn strict_replace_fails_on_missing_needle() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("CMakeLists.txt");
        tokio::fs::write(&file, "project(demo C)\n").await.unwrap();

        assert!(replace_in_file(&file, "absent", "x", true).await.is_err());
        assert!(replace_in_file(&file, "absent", "x", false).await.is_ok());

        replace_in_file(&file, "demo", "renamed", true).await.unwrap();
        let contents = tokio::fs::read_to_string(&file).await.unwrap();
        assert_eq!(contents, "project(renamed C)\n");
    }

    #[tokio::test]
    async fn save_appends() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Cargo.toml");
        save(&file, "[package]\n", false).await.unwrap();
        save(&file, "[profile.release-with-debug]\n", true)
            .await
            .unwrap();
        let contents = tokio::fs::read_to_string(&file).await.unwrap();
        assert!(contents.starts_with("[package]\n"));
        assert!(contents.ends_with("[profile.release-with-debug]\n"));
    }
}
