//! Removes build-system metadata the host re-synthesizes
//!
//! Upstream installs leave `lib/cmake` config packages and `lib/pkgconfig`
//! files behind that reference build-tree paths; consumers get re-declared
//! modules from the generators instead. Documentation trees go with them.

use crate::fileops::rm_rf;
use crate::normalize::reports::Report;
use crate::normalize::traits::Pass;
use crate::normalize::NormalizeOptions;
use ferrite_errors::Error;
use ferrite_recipe::RecipeContext;

pub struct StaleMetadataCleaner;

impl Pass for StaleMetadataCleaner {
    const NAME: &'static str = "stale metadata cleaner";

    async fn run(ctx: &RecipeContext, opts: &NormalizeOptions) -> Result<Report, Error> {
        let package = ctx.package_folder();
        let mut report = Report::ok();

        let mut doomed = Vec::new();
        if !opts.keep_cmake_modules {
            doomed.push(package.join("lib/cmake"));
        }
        if !opts.keep_pkg_config {
            doomed.push(package.join("lib/pkgconfig"));
        }
        if !opts.keep_share {
            doomed.push(package.join("share/man"));
            doomed.push(package.join("share/info"));
            doomed.push(package.join("share/doc"));
        }

        for dir in doomed {
            if dir.exists() {
                rm_rf(&dir).await?;
                report.changed_files.push(dir);
            }
        }
        Ok(report)
    }
}
