//! Deletes debug symbol files unless the recipe retains them

use crate::normalize::passes::walk_files;
use crate::normalize::reports::Report;
use crate::normalize::traits::Pass;
use crate::normalize::NormalizeOptions;
use ferrite_errors::Error;
use ferrite_recipe::RecipeContext;

pub struct PdbCleaner;

impl Pass for PdbCleaner {
    const NAME: &'static str = "pdb cleaner";

    async fn run(ctx: &RecipeContext, opts: &NormalizeOptions) -> Result<Report, Error> {
        if opts.keep_pdbs {
            return Ok(Report::ok());
        }
        let mut report = Report::ok();
        for path in walk_files(ctx.package_folder()) {
            if path.extension().and_then(|e| e.to_str()) == Some("pdb")
                && std::fs::remove_file(&path).is_ok()
            {
                report.changed_files.push(path);
            }
        }
        Ok(report)
    }
}
