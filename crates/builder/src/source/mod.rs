//! Source acquisition: download, verify, unpack, patch
//!
//! Recipes call these from their `source` hook, which is the only state
//! allowed to mutate the fetched tree. Patches must be deterministic in the
//! version alone; options never reach this module.

mod archive;
mod edit;
mod fetch;
mod patch;

pub use archive::unpack;
pub use edit::{replace_in_file, save};
pub use fetch::{download, get};
pub use patch::apply_manifest_patches;
