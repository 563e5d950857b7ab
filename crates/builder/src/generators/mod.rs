//! Toolchain-file generators
//!
//! Each generator renders files under the generators folder for one
//! upstream build system to consume. Generators are deterministic in the
//! resolved state, idempotent, read-only with respect to the package
//! folder, and never touch the network.

use async_trait::async_trait;
use ferrite_errors::Error;
use ferrite_events::{AppEvent, BuildEvent, EventEmitter};
use ferrite_recipe::RecipeContext;
use std::path::PathBuf;

mod autotools;
mod cmake;
mod cmake_deps;
mod meson;
mod pkg_config;

pub use autotools::{
    gnu_triplet, AutotoolsToolchain, AUTOTOOLS_ARGS_FILE, AUTOTOOLS_ENV_FILE,
    AUTOTOOLS_ENV_SCRIPT,
};
pub use cmake::{CMakeToolchain, CMAKE_TOOLCHAIN_FILE};
pub use cmake_deps::CMakeDeps;
pub use meson::{inject_fortran, MesonToolchain, MESON_CROSS_FILE, MESON_NATIVE_FILE};
pub use pkg_config::PkgConfigDeps;

/// A renderer of files for one upstream build system
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generator name (emitted in events)
    fn name(&self) -> &'static str;

    /// Render files under the generators folder
    ///
    /// # Errors
    ///
    /// Returns I/O errors from writing the files.
    async fn generate(&self, ctx: &RecipeContext) -> Result<Vec<PathBuf>, Error>;
}

pub(crate) fn report_written(ctx: &RecipeContext, generator: &'static str, files: &[PathBuf]) {
    ctx.emit(AppEvent::Build(BuildEvent::GeneratorWritten {
        generator: generator.to_string(),
        files: files.to_vec(),
    }));
}
