//! CUDA build driver
//!
//! Reuses the CMake driver and adds a preloaded cache fragment carrying the
//! CUDA architecture list, extra nvcc flags, and the location of the
//! packaged CUDA runtime.

use super::CMake;
use crate::source::save;
use ferrite_errors::Error;
use ferrite_recipe::RecipeContext;
use std::fmt::Write as _;

/// Cache fragment preloaded into the CMake configure step
pub const CUDA_FRAGMENT_FILE: &str = "ferrite_cuda.cmake";

/// Driver for CUDA-enabled CMake projects
pub struct Nvcc {
    cmake: CMake,
    pub architectures: Vec<String>,
    pub extra_flags: Vec<String>,
}

impl Nvcc {
    /// Driver with the default relaxed-constexpr flag set
    #[must_use]
    pub fn new(ctx: &RecipeContext) -> Self {
        Self {
            cmake: CMake::new(ctx),
            architectures: Vec::new(),
            extra_flags: vec!["--expt-relaxed-constexpr".to_string()],
        }
    }

    fn render_fragment(&self, ctx: &RecipeContext) -> String {
        let mut out = String::new();
        if !self.architectures.is_empty() {
            let _ = writeln!(
                out,
                "set(CMAKE_CUDA_ARCHITECTURES \"{}\" CACHE STRING \"\")",
                self.architectures.join(";")
            );
        }
        if !self.extra_flags.is_empty() {
            let _ = writeln!(
                out,
                "set(CMAKE_CUDA_FLAGS \"{}\" CACHE STRING \"\")",
                self.extra_flags.join(" ")
            );
        }
        // Point CMake at the packaged runtime instead of a system toolkit
        if let Ok(cudart) = ctx.dependencies.get("cudart") {
            let _ = writeln!(
                out,
                "set(CUDAToolkit_ROOT \"{}\" CACHE PATH \"\")",
                cudart.package_folder.display()
            );
        }
        out
    }

    /// Write the CUDA fragment and run the configure step with it preloaded
    ///
    /// # Errors
    ///
    /// Returns `BuildError::ConfigureFailed` on a non-zero exit.
    pub async fn configure(
        &self,
        ctx: &RecipeContext,
        build_script_folder: Option<&str>,
    ) -> Result<(), Error> {
        let fragment = ctx.generators_folder().join(CUDA_FRAGMENT_FILE);
        save(&fragment, &self.render_fragment(ctx), false).await?;
        let fragment_arg = fragment.display().to_string();
        self.cmake
            .configure_with_args(ctx, build_script_folder, &["-C", &fragment_arg])
            .await
    }

    /// Run the configured build
    ///
    /// # Errors
    ///
    /// Returns `BuildError::CompileFailed` on a non-zero exit.
    pub async fn build(&self, ctx: &RecipeContext, target: Option<&str>) -> Result<(), Error> {
        self.cmake.build(ctx, target).await
    }

    /// Run the install step
    ///
    /// # Errors
    ///
    /// Returns `BuildError::InstallFailed` on a non-zero exit.
    pub async fn install(&self, ctx: &RecipeContext) -> Result<(), Error> {
        self.cmake.install(ctx).await
    }
}
