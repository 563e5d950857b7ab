//! Autotools build driver

use crate::fileops::unix_path;
use crate::generators::{AUTOTOOLS_ARGS_FILE, AUTOTOOLS_ENV_FILE};
use crate::jobs;
use ferrite_errors::{BuildError, Error};
use ferrite_recipe::{checks, RecipeContext};
use std::collections::HashMap;

/// Driver for Autotools-based upstream projects
///
/// Reads the environment and argument files the generator rendered; under
/// MSVC the recipe runs with `win_bash` and paths are converted to their
/// POSIX form before they reach the configure script.
pub struct Autotools {
    jobs: usize,
}

impl Autotools {
    /// Driver with the governed job count
    #[must_use]
    pub fn new(ctx: &RecipeContext) -> Self {
        Self {
            jobs: jobs::governed_build_jobs(ctx),
        }
    }

    /// Regenerate the configure script from its sources
    ///
    /// # Errors
    ///
    /// Returns `BuildError::ConfigureFailed` on a non-zero exit.
    pub async fn autoreconf(&self, ctx: &RecipeContext) -> Result<(), Error> {
        let env = self.read_env(ctx).await?;
        ctx.run_with_env("autoreconf", &["-fiv"], Some(ctx.source_folder()), &env)
            .await
            .map_err(|e| configure_failed(&e))?;
        Ok(())
    }

    /// Run the configure script with the generated argument vector
    ///
    /// # Errors
    ///
    /// Returns `BuildError::ConfigureFailed` on a non-zero exit.
    pub async fn configure(&self, ctx: &RecipeContext, extra_args: &[&str]) -> Result<(), Error> {
        let env = self.read_env(ctx).await?;
        let args_path = ctx.generators_folder().join(AUTOTOOLS_ARGS_FILE);
        let mut args: Vec<String> = tokio::fs::read_to_string(&args_path)
            .await
            .map_err(|e| Error::io_with_path(&e, &args_path))?
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(ToString::to_string)
            .collect();
        args.extend(extra_args.iter().map(ToString::to_string));

        let script = ctx.source_folder().join("configure");
        let mut script_arg = script.display().to_string();
        if checks::is_msvc(&ctx.settings) {
            script_arg = unix_path(&script_arg);
        }
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let mut full_args = vec![script_arg.as_str()];
        full_args.extend(arg_refs);
        tokio::fs::create_dir_all(ctx.build_folder())
            .await
            .map_err(|e| Error::io_with_path(&e, ctx.build_folder()))?;
        ctx.run_with_env("sh", &full_args, Some(ctx.build_folder()), &env)
            .await
            .map_err(|e| configure_failed(&e))?;
        Ok(())
    }

    /// Run make, optionally one target
    ///
    /// # Errors
    ///
    /// Returns `BuildError::CompileFailed` on a non-zero exit.
    pub async fn make(&self, ctx: &RecipeContext, target: Option<&str>) -> Result<(), Error> {
        super::require_tool("make")?;
        let env = self.read_env(ctx).await?;
        let jobs_arg = format!("-j{}", self.jobs);
        let mut args = vec![jobs_arg.as_str()];
        if let Some(target) = target {
            args.push(target);
        }
        ctx.run_with_env("make", &args, Some(ctx.build_folder()), &env)
            .await
            .map_err(|e| {
                Error::from(BuildError::CompileFailed {
                    message: e.to_string(),
                })
            })?;
        Ok(())
    }

    /// Run the install target
    ///
    /// The prefix was fixed at configure time, so a plain `make install`
    /// lands in the package folder.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::InstallFailed` on a non-zero exit.
    pub async fn install(&self, ctx: &RecipeContext, args: &[&str]) -> Result<(), Error> {
        let env = self.read_env(ctx).await?;
        let mut full_args = vec!["install"];
        full_args.extend(args);
        ctx.run_with_env("make", &full_args, Some(ctx.build_folder()), &env)
            .await
            .map_err(|e| {
                Error::from(BuildError::InstallFailed {
                    message: e.to_string(),
                })
            })?;
        Ok(())
    }

    async fn read_env(&self, ctx: &RecipeContext) -> Result<HashMap<String, String>, Error> {
        let env_path = ctx.generators_folder().join(AUTOTOOLS_ENV_FILE);
        if !env_path.is_file() {
            return Ok(HashMap::new());
        }
        let contents = tokio::fs::read_to_string(&env_path)
            .await
            .map_err(|e| Error::io_with_path(&e, &env_path))?;
        Ok(contents
            .lines()
            .filter_map(|line| {
                line.split_once('=')
                    .map(|(k, v)| (k.to_string(), v.to_string()))
            })
            .collect())
    }
}

fn configure_failed(e: &Error) -> Error {
    BuildError::ConfigureFailed {
        message: e.to_string(),
    }
    .into()
}
