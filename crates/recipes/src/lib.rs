#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Representative recipes
//!
//! One recipe per build-driver family, exercising every corner of the
//! contract: a header-only library, a CMake library with a component graph,
//! an Autotools build with the MSVC wrapper path, a binary repackage of a
//! vendor toolkit component, and a Cargo-built native library.

pub mod cjson;
pub mod cudart;
pub mod eigen;
pub mod flite;
pub mod llguidance;

pub use cjson::Cjson;
pub use cudart::Cudart;
pub use eigen::Eigen;
pub use flite::Flite;
pub use llguidance::Llguidance;
