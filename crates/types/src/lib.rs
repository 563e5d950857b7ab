#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for the ferrite recipe contract
//!
//! This crate provides the fundamental vocabulary shared by recipes and the
//! host: references, versions and ranges, package types, and the platform
//! enums a profile is made of.

pub mod package;
pub mod platform;
pub mod version;

// Re-export commonly used types
pub use package::{PackageType, RecipeRef};
pub use platform::{Arch, BuildType, CompilerKind, Libcxx, MsvcRuntime, Os};
pub use version::{Constraint, ConstraintOp, Version, VersionRange};
