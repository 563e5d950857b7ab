//! Cleaner that removes libtool archive (.la) files
//!
//! They embed build-tree absolute paths and break relocation.

use crate::normalize::passes::walk_files;
use crate::normalize::reports::Report;
use crate::normalize::traits::Pass;
use crate::normalize::NormalizeOptions;
use ferrite_errors::Error;
use ferrite_recipe::RecipeContext;

pub struct LaFileCleaner;

impl Pass for LaFileCleaner {
    const NAME: &'static str = "libtool archive cleaner";

    async fn run(ctx: &RecipeContext, _opts: &NormalizeOptions) -> Result<Report, Error> {
        let mut report = Report::ok();
        for path in walk_files(ctx.package_folder()) {
            if path.extension().and_then(|e| e.to_str()) == Some("la") {
                if std::fs::remove_file(&path).is_ok() {
                    report.changed_files.push(path);
                }
                // Ignore removal errors
            }
        }
        if !report.changed_files.is_empty() {
            report
                .warnings
                .push(format!("removed {} libtool archives", report.changed_files.len()));
        }
        Ok(report)
    }
}
