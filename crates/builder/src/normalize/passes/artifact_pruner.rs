//! Deletes the artifact flavor the build did not ask for
//!
//! Some upstream builds cannot be told to produce only shared or only
//! static libraries; the unwanted flavor is deleted after the fact so the
//! package matches its `shared` option.

use crate::normalize::passes::walk_files;
use crate::normalize::reports::Report;
use crate::normalize::traits::Pass;
use crate::normalize::{NormalizeOptions, Prune};
use ferrite_errors::Error;
use ferrite_recipe::RecipeContext;
use std::path::Path;

pub struct ArtifactPruner;

fn is_shared_artifact(name: &str) -> bool {
    name.contains(".so") || name.contains(".dylib") || name.ends_with(".dll")
}

// `.lib` stays untouched: on Windows it may be the import library of the
// shared build, which the consumer still links against
fn is_static_artifact(name: &str) -> bool {
    name.ends_with(".a") && !name.ends_with(".dll.a")
}

impl Pass for ArtifactPruner {
    const NAME: &'static str = "artifact pruner";

    async fn run(ctx: &RecipeContext, opts: &NormalizeOptions) -> Result<Report, Error> {
        let Some(prune) = opts.prune else {
            return Ok(Report::ok());
        };
        let mut report = Report::ok();
        for dir in ["lib", "bin"] {
            prune_dir(&ctx.package_folder().join(dir), prune, &mut report);
        }
        Ok(report)
    }
}

fn prune_dir(dir: &Path, prune: Prune, report: &mut Report) {
    for path in walk_files(dir) {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let doomed = match prune {
            Prune::SharedArtifacts => is_shared_artifact(name),
            Prune::StaticArtifacts => is_static_artifact(name),
        };
        if doomed && std::fs::remove_file(&path).is_ok() {
            report.changed_files.push(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_classification() {
        assert!(is_shared_artifact("libz.so.1.3"));
        assert!(is_shared_artifact("libz.dylib"));
        assert!(is_shared_artifact("z.dll"));
        assert!(!is_shared_artifact("libz.a"));
        assert!(is_static_artifact("libz.a"));
        // Import libraries belong to the shared flavor
        assert!(!is_static_artifact("libz.dll.a"));
        assert!(!is_static_artifact("z.lib"));
    }
}
