//! Folder roles bound at layout time

use ferrite_types::BuildType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The four folder roles every recipe works with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub source_folder: PathBuf,
    pub build_folder: PathBuf,
    pub generators_folder: PathBuf,
    pub package_folder: PathBuf,
}

impl Layout {
    /// Flat layout: `src/`, `build/`, `build/generators/`, `package/`
    #[must_use]
    pub fn basic(base: &Path) -> Self {
        let build_folder = base.join("build");
        Self {
            source_folder: base.join("src"),
            generators_folder: build_folder.join("generators"),
            build_folder,
            package_folder: base.join("package"),
        }
    }

    /// CMake layout: per-configuration build subfolder
    /// (`build/Release`, `build/Debug`, ...)
    #[must_use]
    pub fn cmake(base: &Path, build_type: BuildType) -> Self {
        let build_folder = base.join("build").join(build_type.as_str());
        Self {
            source_folder: base.join("src"),
            generators_folder: build_folder.join("generators"),
            build_folder,
            package_folder: base.join("package"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cmake_layout_is_per_configuration() {
        let base = Path::new("/tmp/work");
        let release = Layout::cmake(base, BuildType::Release);
        let debug = Layout::cmake(base, BuildType::Debug);
        assert_ne!(release.build_folder, debug.build_folder);
        assert!(release.build_folder.ends_with("build/Release"));
        assert!(release.generators_folder.starts_with(&release.build_folder));
    }
}
