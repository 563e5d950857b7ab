//! Manifest-driven patch application

use ferrite_errors::{Error, SourceError};
use ferrite_events::{AppEvent, EventEmitter, SourceEvent};
use ferrite_recipe::RecipeContext;

/// Apply the manifest's patch list for the current version
///
/// Patches live under the export-sources folder and apply in manifest
/// order with `patch -p1`, each from its declared base path (the source
/// root by default).
///
/// # Errors
///
/// Returns `SourceError::PatchFailed` naming the first patch that did not
/// apply.
pub async fn apply_manifest_patches(ctx: &RecipeContext) -> Result<(), Error> {
    let version = ctx.reference().version.as_str().to_string();
    let patches = ctx.manifest.patches_for(&version).to_vec();
    for entry in patches {
        let patch_path = ctx.export_sources_folder().join(&entry.patch_file);
        if !patch_path.is_file() {
            return Err(SourceError::PatchFailed {
                patch: entry.patch_file.clone(),
                message: "patch file was not exported with the recipe".to_string(),
            }
            .into());
        }
        let cwd = match &entry.base_path {
            Some(base) => ctx.source_folder().join(base),
            None => ctx.source_folder().to_path_buf(),
        };
        let patch_arg = patch_path.display().to_string();
        ctx.run("patch", &["-p1", "-i", &patch_arg], Some(&cwd))
            .await
            .map_err(|e| SourceError::PatchFailed {
                patch: entry.patch_file.clone(),
                message: e.to_string(),
            })?;
        ctx.emit(AppEvent::Source(SourceEvent::PatchApplied {
            patch: entry.patch_file.clone(),
        }));
    }
    Ok(())
}
