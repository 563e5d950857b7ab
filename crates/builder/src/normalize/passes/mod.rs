//! The individual normalization passes, in pipeline order

mod artifact_pruner;
mod install_names;
mod la_cleaner;
mod licenses;
mod msvc_libname;
mod pdb_cleaner;
mod runtime_dlls;
mod stale_metadata;

pub use artifact_pruner::ArtifactPruner;
pub use install_names::InstallNameFixer;
pub use la_cleaner::LaFileCleaner;
pub use licenses::{extract_license_header, LicenseCapturePass};
pub use msvc_libname::MsvcLibnameFixer;
pub use pdb_cleaner::PdbCleaner;
pub use runtime_dlls::RuntimeDllCleaner;
pub use stale_metadata::StaleMetadataCleaner;

use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// All files below a root, in walk order
pub(crate) fn walk_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in WalkBuilder::new(root).hidden(false).parents(false).build() {
        let Ok(entry) = entry else { continue };
        let path = entry.into_path();
        if path.is_file() {
            files.push(path);
        }
    }
    files
}
