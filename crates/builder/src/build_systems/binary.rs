//! Binary repackage driver
//!
//! No build happens: the recipe downloads a prebuilt archive whose
//! structure is known and rearranges its files into the package layout.
//! Common for vendor toolkit components shipped as redistributable
//! archives.

use crate::fileops;
use crate::source;
use ferrite_errors::{Error, PackagingError};
use ferrite_manifest::SourceEntry;
use ferrite_recipe::RecipeContext;
use std::path::{Path, PathBuf};

/// Helper for recipes that repackage prebuilt archives
pub struct BinaryRepackage;

impl BinaryRepackage {
    /// Download and unpack a prebuilt archive under the build folder
    ///
    /// Returns the staging directory holding the unpacked tree.
    ///
    /// # Errors
    ///
    /// Returns fetch, digest, or extraction errors from the download.
    pub async fn stage(ctx: &RecipeContext, entry: &SourceEntry) -> Result<PathBuf, Error> {
        let staging = ctx.build_folder().join("prebuilt");
        source::get(ctx, entry, &staging).await?;
        Ok(staging)
    }

    /// Move files matching a glob from the staged tree into the package
    ///
    /// The relative path below `src_subdir` is preserved under `dest_dir`.
    ///
    /// # Errors
    ///
    /// Returns `PackagingError::MissingArtifact` when nothing matched.
    pub async fn deploy(
        ctx: &RecipeContext,
        staging: &Path,
        src_subdir: &str,
        pattern: &str,
        dest_dir: &str,
    ) -> Result<usize, Error> {
        let src_base = staging.join(src_subdir);
        let dest_base = ctx.package_folder().join(dest_dir);
        let copied = fileops::copy_glob(&src_base, pattern, &dest_base).await?;
        if copied == 0 {
            return Err(PackagingError::MissingArtifact {
                path: format!("{}/{pattern}", src_base.display()),
            }
            .into());
        }
        Ok(copied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrite_recipe::{Layout, Options, Settings};
    use ferrite_types::{RecipeRef, Version};

    #[tokio::test]
    async fn deploy_requires_a_match() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = RecipeContext::new(
            RecipeRef::new("cudart", Version::parse("12.4.127").unwrap()),
            Settings::default(),
            Settings::default(),
            Options::new(),
            dir.path().to_path_buf(),
        );
        ctx.set_layout(Layout::basic(dir.path()));
        let staging = ctx.build_folder().join("prebuilt");
        tokio::fs::create_dir_all(staging.join("lib"))
            .await
            .unwrap();
        tokio::fs::write(staging.join("lib/libcudart.so.12"), b"elf")
            .await
            .unwrap();

        let copied = BinaryRepackage::deploy(&ctx, &staging, "lib", "*.so*", "lib")
            .await
            .unwrap();
        assert_eq!(copied, 1);
        assert!(ctx.package_folder().join("lib/libcudart.so.12").is_file());

        let missing =
            BinaryRepackage::deploy(&ctx, &staging, "lib", "*.dylib", "lib").await;
        assert!(missing.is_err());
    }
}
