//! Thin adapters around the external build systems
//!
//! Each adapter shells out through the recipe context; parallelism is the
//! external tool's business and is bounded by the governed job count. A
//! non-zero exit maps onto the build error taxonomy with the driver phase
//! that failed.

mod autotools;
mod binary;
mod cargo;
mod cmake;
mod meson;
mod nvcc;

pub use autotools::Autotools;
pub use binary::BinaryRepackage;
pub use cargo::CargoBuild;
pub use cmake::CMake;
pub use meson::Meson;
pub use nvcc::Nvcc;

use ferrite_errors::{BuildError, Error};

/// Fail early when an external tool is not on PATH
pub(crate) fn require_tool(tool: &str) -> Result<(), Error> {
    which::which(tool).map(|_| ()).map_err(|_| {
        BuildError::ToolMissing {
            tool: tool.to_string(),
        }
        .into()
    })
}
