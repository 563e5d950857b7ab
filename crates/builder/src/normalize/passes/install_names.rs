//! Rewrites Mach-O install names so clients resolve via `@rpath`
//!
//! Runs before any pass that renames or prunes libraries; the id embedded
//! in the dylib must match the file name it ships under.

use crate::normalize::passes::walk_files;
use crate::normalize::reports::Report;
use crate::normalize::traits::Pass;
use crate::normalize::NormalizeOptions;
use ferrite_errors::Error;
use ferrite_recipe::{checks, RecipeContext};

pub struct InstallNameFixer;

impl Pass for InstallNameFixer {
    const NAME: &'static str = "install name fixer";

    async fn run(ctx: &RecipeContext, _opts: &NormalizeOptions) -> Result<Report, Error> {
        if !checks::is_apple_os(&ctx.settings) {
            return Ok(Report::ok());
        }
        let mut report = Report::ok();
        for path in walk_files(&ctx.package_folder().join("lib")) {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !name.contains(".dylib") {
                continue;
            }
            let id = format!("@rpath/{name}");
            let path_arg = path.display().to_string();
            match ctx
                .run("install_name_tool", &["-id", &id, &path_arg], None)
                .await
            {
                Ok(_) => report.changed_files.push(path),
                Err(e) => report
                    .errors
                    .push(format!("install_name_tool failed for {name}: {e}")),
            }
        }
        Ok(report)
    }
}
