//! Post-install normalization pipeline
//!
//! Turns the raw tree an upstream install step produced into the package
//! layout consumers rely on. Passes run in a fixed order (install-name
//! fixup has to happen while the original library names are still in
//! place, pruning before the license capture scans the tree) and each pass
//! reports what it changed.

pub mod passes;
pub mod reports;
pub mod traits;

use ferrite_errors::{Error, PackagingError};
use ferrite_events::{AppEvent, EventEmitter, PackageEvent};
use ferrite_recipe::RecipeContext;
use reports::MergedReport;
use traits::Pass;

/// Which flavor of artifacts to delete after the install step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prune {
    /// Delete shared libraries (the build was static)
    SharedArtifacts,
    /// Delete static archives (the build was shared)
    StaticArtifacts,
}

/// Where the packaged license comes from
#[derive(Debug, Clone)]
pub enum LicenseCapture {
    /// A standalone file relative to the source folder
    File { path: String },
    /// No standalone file ships; extract the leading comment block of this
    /// source-relative header
    HeaderBlock { path: String },
}

/// Knobs of the normalization pipeline, set per recipe
#[derive(Debug, Clone, Default)]
pub struct NormalizeOptions {
    /// Keep `lib/cmake` because the recipe re-declares those modules
    pub keep_cmake_modules: bool,
    /// Keep `lib/pkgconfig` because the recipe re-declares the files
    pub keep_pkg_config: bool,
    /// Keep debug symbol files
    pub keep_pdbs: bool,
    /// Keep `share/` data (locale, aclocal and the like)
    pub keep_share: bool,
    pub prune: Option<Prune>,
    pub license: Option<LicenseCapture>,
}

/// Run the full pass pipeline over the populated package folder
///
/// # Errors
///
/// Returns `PackagingError::NormalizationFailed` when a pass reports a
/// fatal condition, and the pass's own error when it cannot run at all.
pub async fn run_normalization(
    ctx: &RecipeContext,
    opts: &NormalizeOptions,
) -> Result<(), Error> {
    let mut merged = MergedReport::default();

    run_pass::<passes::StaleMetadataCleaner>(ctx, opts, &mut merged).await?;
    run_pass::<passes::LaFileCleaner>(ctx, opts, &mut merged).await?;
    run_pass::<passes::InstallNameFixer>(ctx, opts, &mut merged).await?;
    run_pass::<passes::ArtifactPruner>(ctx, opts, &mut merged).await?;
    run_pass::<passes::MsvcLibnameFixer>(ctx, opts, &mut merged).await?;
    run_pass::<passes::RuntimeDllCleaner>(ctx, opts, &mut merged).await?;
    run_pass::<passes::PdbCleaner>(ctx, opts, &mut merged).await?;
    run_pass::<passes::LicenseCapturePass>(ctx, opts, &mut merged).await?;

    if merged.is_fatal() {
        return Err(PackagingError::NormalizationFailed {
            pass: "pipeline".to_string(),
            message: merged.render("package normalization failed"),
        }
        .into());
    }
    Ok(())
}

async fn run_pass<P: Pass>(
    ctx: &RecipeContext,
    opts: &NormalizeOptions,
    merged: &mut MergedReport,
) -> Result<(), Error> {
    let report = P::run(ctx, opts).await?;
    ctx.emit(AppEvent::Package(PackageEvent::NormalizationPassRan {
        pass: P::NAME.to_string(),
        changed: report.changed_files.len(),
    }));
    if report.is_fatal() {
        return Err(PackagingError::NormalizationFailed {
            pass: P::NAME.to_string(),
            message: report.render(P::NAME),
        }
        .into());
    }
    merged.absorb(report);
    Ok(())
}
