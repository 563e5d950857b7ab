//! Filesystem helpers shared by `package()` implementations

use ferrite_errors::{Error, PackagingError};
use globset::{Glob, GlobSetBuilder};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Copy files matching a glob, preserving their path relative to `src_base`
///
/// Returns the number of files copied.
///
/// # Errors
///
/// Returns an error for an invalid pattern or a failing copy.
pub async fn copy_glob(src_base: &Path, pattern: &str, dst_base: &Path) -> Result<usize, Error> {
    let glob = Glob::new(pattern)
        .map_err(|e| Error::internal(format!("invalid glob '{pattern}': {e}")))?;
    let matcher = GlobSetBuilder::new()
        .add(glob)
        .build()
        .map_err(|e| Error::internal(format!("invalid glob '{pattern}': {e}")))?;

    let mut copied = 0;
    for entry in WalkBuilder::new(src_base).hidden(false).parents(false).build() {
        let Ok(entry) = entry else { continue };
        let path = entry.into_path();
        if !path.is_file() {
            continue;
        }
        let Ok(relative) = path.strip_prefix(src_base) else {
            continue;
        };
        if !matcher.is_match(relative) {
            continue;
        }
        let dest = dst_base.join(relative);
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::io_with_path(&e, parent))?;
        }
        tokio::fs::copy(&path, &dest)
            .await
            .map_err(|e| Error::io_with_path(&e, &path))?;
        copied += 1;
    }
    Ok(copied)
}

/// Copy a single file into a directory, creating it as needed
///
/// # Errors
///
/// Returns `PackagingError::MissingArtifact` when the source is absent.
pub async fn copy_file(src: &Path, dst_dir: &Path) -> Result<PathBuf, Error> {
    if !src.is_file() {
        return Err(PackagingError::MissingArtifact {
            path: src.display().to_string(),
        }
        .into());
    }
    tokio::fs::create_dir_all(dst_dir)
        .await
        .map_err(|e| Error::io_with_path(&e, dst_dir))?;
    let file_name = src
        .file_name()
        .ok_or_else(|| Error::internal(format!("no file name in {}", src.display())))?;
    let dest = dst_dir.join(file_name);
    tokio::fs::copy(src, &dest)
        .await
        .map_err(|e| Error::io_with_path(&e, src))?;
    Ok(dest)
}

/// Remove a file or directory tree, ignoring a missing target
///
/// # Errors
///
/// Returns an I/O error for failures other than the target being absent.
pub async fn rm_rf(path: &Path) -> Result<(), Error> {
    let result = if path.is_dir() {
        tokio::fs::remove_dir_all(path).await
    } else {
        tokio::fs::remove_file(path).await
    };
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::io_with_path(&e, path)),
    }
}

/// Convert a Windows path to the POSIX form an msys2 shell expects
///
/// `C:\src\lib` becomes `/c/src/lib`; forward slashes pass through.
#[must_use]
pub fn unix_path(path: &str) -> String {
    let forward = path.replace('\\', "/");
    let mut chars = forward.chars();
    match (chars.next(), chars.next()) {
        (Some(drive), Some(':')) if drive.is_ascii_alphabetic() => {
            format!("/{}{}", drive.to_ascii_lowercase(), chars.collect::<String>())
        }
        _ => forward,
    }
}

/// Library base names found under `lib/` of a package tree
///
/// Strips the `lib` prefix (except on Windows import libraries), versioned
/// suffixes, and the extension: `libcjson.so.1.7.18` reports as `cjson`.
#[must_use]
pub fn collect_libs(package_folder: &Path) -> Vec<String> {
    let lib_dir = package_folder.join("lib");
    let mut names = Vec::new();
    let Ok(entries) = std::fs::read_dir(&lib_dir) else {
        return names;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(name) = lib_base_name(file_name) else {
            continue;
        };
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names.sort();
    names
}

fn lib_base_name(file_name: &str) -> Option<String> {
    let known = [".a", ".so", ".dylib", ".lib", ".dll"];
    let dot_split: Vec<&str> = file_name.split('.').collect();
    let stem = dot_split.first()?;
    let has_lib_ext = known.iter().any(|ext| {
        file_name.ends_with(ext) || file_name.contains(&format!("{ext}."))
    });
    if !has_lib_ext {
        return None;
    }
    let base = stem.strip_prefix("lib").unwrap_or(stem);
    if base.is_empty() {
        None
    } else {
        Some(base.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_path_converts_drive_letters() {
        assert_eq!(unix_path("C:\\src\\lib"), "/c/src/lib");
        assert_eq!(unix_path("relative/path"), "relative/path");
        assert_eq!(unix_path("D:/already/forward"), "/d/already/forward");
    }

    #[test]
    fn lib_base_names() {
        assert_eq!(lib_base_name("libcjson.so.1.7.18"), Some("cjson".into()));
        assert_eq!(lib_base_name("libz.a"), Some("z".into()));
        assert_eq!(lib_base_name("cjson.lib"), Some("cjson".into()));
        assert_eq!(lib_base_name("README"), None);
    }

    #[tokio::test]
    async fn copy_glob_preserves_relative_paths() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        tokio::fs::create_dir_all(src.path().join("include/deep"))
            .await
            .unwrap();
        tokio::fs::write(src.path().join("include/deep/a.h"), b"")
            .await
            .unwrap();
        tokio::fs::write(src.path().join("skip.c"), b"")
            .await
            .unwrap();
        let copied = copy_glob(src.path(), "include/**/*.h", dst.path())
            .await
            .unwrap();
        assert_eq!(copied, 1);
        assert!(dst.path().join("include/deep/a.h").is_file());
        assert!(!dst.path().join("skip.c").exists());
    }

    #[tokio::test]
    async fn rm_rf_ignores_missing() {
        assert!(rm_rf(Path::new("/nonexistent/definitely/missing"))
            .await
            .is_ok());
    }
}
