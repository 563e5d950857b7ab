//! Deletes MSVC runtime DLLs that cross-builds drop into `bin/`
//!
//! `concrt*.dll`, `msvcp*.dll` and `vcruntime*.dll` belong to the
//! redistributable, not to the package.

use crate::normalize::passes::walk_files;
use crate::normalize::reports::Report;
use crate::normalize::traits::Pass;
use crate::normalize::NormalizeOptions;
use ferrite_errors::Error;
use ferrite_recipe::RecipeContext;

pub struct RuntimeDllCleaner;

fn is_runtime_dll(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with(".dll")
        && (lower.starts_with("concrt")
            || lower.starts_with("msvcp")
            || lower.starts_with("vcruntime"))
}

impl Pass for RuntimeDllCleaner {
    const NAME: &'static str = "msvc runtime dll cleaner";

    async fn run(ctx: &RecipeContext, _opts: &NormalizeOptions) -> Result<Report, Error> {
        let mut report = Report::ok();
        for path in walk_files(&ctx.package_folder().join("bin")) {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if is_runtime_dll(name) && std::fs::remove_file(&path).is_ok() {
                report.changed_files.push(path);
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_dll_detection() {
        assert!(is_runtime_dll("vcruntime140.dll"));
        assert!(is_runtime_dll("MSVCP140.dll"));
        assert!(is_runtime_dll("concrt140.dll"));
        assert!(!is_runtime_dll("flite.dll"));
    }
}
