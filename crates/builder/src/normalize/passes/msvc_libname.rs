//! Renames MSVC import libraries to the name consumers link against
//!
//! Upstream builds leave `foo.dll.lib` or MinGW-style `libfoo.a` in `lib/`;
//! the canonical name is `foo.lib`.

use crate::normalize::passes::walk_files;
use crate::normalize::reports::Report;
use crate::normalize::traits::Pass;
use crate::normalize::NormalizeOptions;
use ferrite_errors::Error;
use ferrite_recipe::{checks, RecipeContext};

pub struct MsvcLibnameFixer;

fn canonical_name(file_name: &str) -> Option<String> {
    if let Some(base) = file_name.strip_suffix(".dll.lib") {
        return Some(format!("{base}.lib"));
    }
    if let Some(base) = file_name
        .strip_prefix("lib")
        .and_then(|rest| rest.strip_suffix(".a"))
    {
        if !base.is_empty() {
            return Some(format!("{base}.lib"));
        }
    }
    None
}

impl Pass for MsvcLibnameFixer {
    const NAME: &'static str = "msvc libname fixer";

    async fn run(ctx: &RecipeContext, _opts: &NormalizeOptions) -> Result<Report, Error> {
        if !checks::is_msvc(&ctx.settings) {
            return Ok(Report::ok());
        }
        let mut report = Report::ok();
        for path in walk_files(&ctx.package_folder().join("lib")) {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(canonical) = canonical_name(name) else {
                continue;
            };
            let target = path.with_file_name(&canonical);
            match tokio::fs::rename(&path, &target).await {
                Ok(()) => report.changed_files.push(target),
                Err(e) => report
                    .errors
                    .push(format!("renaming {name} to {canonical}: {e}")),
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names() {
        assert_eq!(canonical_name("flite.dll.lib"), Some("flite.lib".into()));
        assert_eq!(canonical_name("libflite.a"), Some("flite.lib".into()));
        assert_eq!(canonical_name("flite.lib"), None);
        assert_eq!(canonical_name("lib.a"), None);
    }
}
