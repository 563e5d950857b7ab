//! Meson build driver

use crate::generators::MesonToolchain;
use crate::jobs;
use ferrite_errors::{BuildError, Error};
use ferrite_recipe::{checks, RecipeContext};

/// Driver for Meson-based upstream projects
pub struct Meson {
    jobs: usize,
}

impl Meson {
    /// Driver with the governed job count
    #[must_use]
    pub fn new(ctx: &RecipeContext) -> Self {
        Self {
            jobs: jobs::governed_build_jobs(ctx),
        }
    }

    /// Run `meson setup` against the generated machine file
    ///
    /// The cross file is picked automatically when the build and host
    /// profiles describe different machines.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::ConfigureFailed` on a non-zero exit.
    pub async fn configure(&self, ctx: &RecipeContext) -> Result<(), Error> {
        super::require_tool("meson")?;
        let machine_file = ctx
            .generators_folder()
            .join(MesonToolchain::machine_file(ctx));
        let file_flag = if checks::cross_building(ctx) {
            "--cross-file"
        } else {
            "--native-file"
        };
        let machine_arg = machine_file.display().to_string();
        let build_arg = ctx.build_folder().display().to_string();
        let source_arg = ctx.source_folder().display().to_string();
        ctx.run(
            "meson",
            &["setup", &build_arg, &source_arg, file_flag, &machine_arg],
            Some(ctx.source_folder()),
        )
        .await
        .map_err(|e| {
            Error::from(BuildError::ConfigureFailed {
                message: e.to_string(),
            })
        })?;
        Ok(())
    }

    /// Run `meson compile`
    ///
    /// # Errors
    ///
    /// Returns `BuildError::CompileFailed` on a non-zero exit.
    pub async fn build(&self, ctx: &RecipeContext) -> Result<(), Error> {
        let build_arg = ctx.build_folder().display().to_string();
        let jobs_arg = self.jobs.to_string();
        ctx.run(
            "meson",
            &["compile", "-C", &build_arg, "-j", &jobs_arg],
            Some(ctx.build_folder()),
        )
        .await
        .map_err(|e| {
            Error::from(BuildError::CompileFailed {
                message: e.to_string(),
            })
        })?;
        Ok(())
    }

    /// Run `meson install`
    ///
    /// # Errors
    ///
    /// Returns `BuildError::InstallFailed` on a non-zero exit.
    pub async fn install(&self, ctx: &RecipeContext) -> Result<(), Error> {
        let build_arg = ctx.build_folder().display().to_string();
        ctx.run(
            "meson",
            &["install", "-C", &build_arg],
            Some(ctx.build_folder()),
        )
        .await
        .map_err(|e| {
            Error::from(BuildError::InstallFailed {
                message: e.to_string(),
            })
        })?;
        Ok(())
    }
}
