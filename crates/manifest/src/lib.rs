#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Sidecar manifest handling for recipes
//!
//! Each recipe carries a declarative YAML sidecar mapping every packaged
//! version to its upstream archive (url + sha256) and an ordered patch list.
//! The manifest is the sole authoritative reference between a recipe and an
//! upstream artifact; recipes read it through [`RecipeManifest`].

use ferrite_errors::{Error, SourceError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;

/// Upstream archive for one version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceEntry {
    pub url: String,
    pub sha256: String,

    /// Elide the archive's single top-level directory while unpacking
    #[serde(default)]
    pub strip_root: bool,
}

/// One patch applied on top of the unpacked sources
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchEntry {
    pub patch_file: String,

    /// Directory the patch paths are relative to, defaults to the source root
    #[serde(default)]
    pub base_path: Option<String>,

    #[serde(default)]
    pub patch_description: Option<String>,
}

/// Parsed sidecar manifest (`manifest.yml` next to the recipe)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipeManifest {
    #[serde(default)]
    pub sources: BTreeMap<String, SourceEntry>,

    #[serde(default)]
    pub patches: BTreeMap<String, Vec<PatchEntry>>,
}

impl RecipeManifest {
    /// Parse a manifest from YAML text
    ///
    /// # Errors
    ///
    /// Returns an internal error when the YAML does not match the schema.
    pub fn from_yaml(yaml: &str) -> Result<Self, Error> {
        serde_yml::from_str(yaml).map_err(|e| Error::internal(format!("manifest parse: {e}")))
    }

    /// Load a manifest file from disk
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load(path: &Path) -> Result<Self, Error> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::io_with_path(&e, path))?;
        Self::from_yaml(&contents)
    }

    /// Source entry for a version
    ///
    /// # Errors
    ///
    /// Returns `SourceError::NoSourceForVersion` when the version is absent.
    pub fn source_for(&self, version: &str) -> Result<&SourceEntry, Error> {
        self.sources
            .get(version)
            .ok_or_else(|| {
                SourceError::NoSourceForVersion {
                    version: version.to_string(),
                }
                .into()
            })
    }

    /// Ordered patch list for a version; empty when none are declared
    #[must_use]
    pub fn patches_for(&self, version: &str) -> &[PatchEntry] {
        self.patches.get(version).map_or(&[], Vec::as_slice)
    }

    /// Digest of the patch list, part of the source cache key
    ///
    /// Hashes file names in order so that adding, removing, or reordering
    /// patches invalidates cached sources for the version.
    #[must_use]
    pub fn patch_digest(&self, version: &str) -> String {
        let mut hasher = Sha256::new();
        for patch in self.patches_for(version) {
            hasher.update(patch.patch_file.as_bytes());
            hasher.update([0u8]);
        }
        format!("{:x}", hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
sources:
  "1.7.18":
    url: "https://github.com/DaveGamble/cJSON/archive/v1.7.18.tar.gz"
    sha256: "3aa806844a03442c00769b83e99970be70fbef03735ff898f4811dd03b9f5ee5"
    strip_root: true
  "1.7.17":
    url: "https://github.com/DaveGamble/cJSON/archive/v1.7.17.tar.gz"
    sha256: "c91d1eeb7175c50d49f6ba2a25e69b46bd05cffb798382c19bfb202e467ec51c"
patches:
  "1.7.17":
    - patch_file: "patches/0001-fix-misc-utils.patch"
      patch_description: "fix build of the utils library"
"#;

    #[test]
    fn parse_and_lookup() {
        let manifest = RecipeManifest::from_yaml(MANIFEST).unwrap();
        let entry = manifest.source_for("1.7.18").unwrap();
        assert!(entry.strip_root);
        assert!(entry.url.ends_with("v1.7.18.tar.gz"));
        assert!(manifest.source_for("9.9.9").is_err());
    }

    #[test]
    fn patches_default_to_empty() {
        let manifest = RecipeManifest::from_yaml(MANIFEST).unwrap();
        assert!(manifest.patches_for("1.7.18").is_empty());
        assert_eq!(manifest.patches_for("1.7.17").len(), 1);
    }

    #[test]
    fn patch_digest_tracks_list_changes() {
        let manifest = RecipeManifest::from_yaml(MANIFEST).unwrap();
        let with = manifest.patch_digest("1.7.17");
        let without = manifest.patch_digest("1.7.18");
        assert_ne!(with, without);
        // Stable across calls
        assert_eq!(with, manifest.patch_digest("1.7.17"));
    }
}
