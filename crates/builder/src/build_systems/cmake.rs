//! CMake build driver

use crate::generators::CMAKE_TOOLCHAIN_FILE;
use crate::jobs;
use ferrite_errors::{BuildError, Error};
use ferrite_recipe::{checks, RecipeContext};

/// Driver for CMake-based upstream projects
pub struct CMake {
    jobs: usize,
}

impl CMake {
    /// Driver with the governed job count
    #[must_use]
    pub fn new(ctx: &RecipeContext) -> Self {
        Self {
            jobs: jobs::governed_build_jobs(ctx),
        }
    }

    /// Run the configure step with the generated toolchain file
    ///
    /// `build_script_folder` points at the CMakeLists.txt location when it
    /// is not the source root.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::ConfigureFailed` on a non-zero exit.
    pub async fn configure(
        &self,
        ctx: &RecipeContext,
        build_script_folder: Option<&str>,
    ) -> Result<(), Error> {
        self.configure_with_args(ctx, build_script_folder, &[]).await
    }

    /// Configure with extra command-line arguments (cache preloads and the
    /// like); most recipes pass variables through the toolchain instead
    ///
    /// # Errors
    ///
    /// Returns `BuildError::ConfigureFailed` on a non-zero exit.
    pub async fn configure_with_args(
        &self,
        ctx: &RecipeContext,
        build_script_folder: Option<&str>,
        extra_args: &[&str],
    ) -> Result<(), Error> {
        super::require_tool("cmake")?;
        let source_dir = match build_script_folder {
            Some(sub) => ctx.source_folder().join(sub),
            None => ctx.source_folder().to_path_buf(),
        };
        let toolchain = ctx.generators_folder().join(CMAKE_TOOLCHAIN_FILE);
        let source_arg = source_dir.display().to_string();
        let build_arg = ctx.build_folder().display().to_string();
        let toolchain_arg = format!("-DCMAKE_TOOLCHAIN_FILE={}", toolchain.display());
        let prefix_arg = format!(
            "-DCMAKE_INSTALL_PREFIX={}",
            ctx.package_folder().display()
        );
        let mut args = vec!["-S", &source_arg, "-B", &build_arg, &toolchain_arg, &prefix_arg];
        args.extend(extra_args);
        ctx.run("cmake", &args, Some(ctx.build_folder()))
            .await
            .map_err(|e| configure_failed(&e))?;
        Ok(())
    }

    /// Run the configured build, optionally one target
    ///
    /// # Errors
    ///
    /// Returns `BuildError::CompileFailed` on a non-zero exit.
    pub async fn build(&self, ctx: &RecipeContext, target: Option<&str>) -> Result<(), Error> {
        let build_arg = ctx.build_folder().display().to_string();
        let jobs_arg = self.jobs.to_string();
        let mut args = vec!["--build", &build_arg, "--parallel", &jobs_arg];
        if checks::is_msvc(&ctx.settings) {
            // Multi-config generators need the configuration at build time
            if let Ok(build_type) = ctx.settings.build_type() {
                args.push("--config");
                args.push(build_type.as_str());
            }
        }
        if let Some(target) = target {
            args.push("--target");
            args.push(target);
        }
        ctx.run("cmake", &args, Some(ctx.build_folder()))
            .await
            .map_err(|e| {
                Error::from(BuildError::CompileFailed {
                    message: e.to_string(),
                })
            })?;
        Ok(())
    }

    /// Run the install step into the package folder
    ///
    /// # Errors
    ///
    /// Returns `BuildError::InstallFailed` on a non-zero exit.
    pub async fn install(&self, ctx: &RecipeContext) -> Result<(), Error> {
        let build_arg = ctx.build_folder().display().to_string();
        let prefix_arg = ctx.package_folder().display().to_string();
        ctx.run(
            "cmake",
            &["--install", &build_arg, "--prefix", &prefix_arg],
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

fn configure_failed(e: &Error) -> Error {
    BuildError::ConfigureFailed {
        message: e.to_string(),
    }
    .into()
}
