//! Validation helpers recipes call from `validate` and `configure`

use crate::context::RecipeContext;
use crate::settings::Settings;
use ferrite_errors::{Error, RecipeError};
use ferrite_types::CompilerKind;

fn invalid(ctx: &RecipeContext, message: String) -> Error {
    RecipeError::ConfigurationInvalid {
        reference: ctx.reference().to_string(),
        message,
    }
    .into()
}

/// Fail when the profile's C++ standard is below `min`
///
/// # Errors
///
/// Returns `ConfigurationInvalid` when `compiler.cppstd` is unset or lower
/// than the requirement.
pub fn check_min_cppstd(ctx: &RecipeContext, min: u32) -> Result<(), Error> {
    match ctx.settings.compiler().ok().and_then(|c| c.cppstd) {
        Some(cppstd) if cppstd_at_least(cppstd, min) => Ok(()),
        Some(cppstd) => Err(invalid(
            ctx,
            format!("requires C++{min}, profile provides C++{cppstd}"),
        )),
        None => Err(invalid(
            ctx,
            format!("requires C++{min}, profile does not declare compiler.cppstd"),
        )),
    }
}

/// Fail when the profile's C++ standard is above `max`
///
/// # Errors
///
/// Returns `ConfigurationInvalid` when `compiler.cppstd` exceeds `max`.
pub fn check_max_cppstd(ctx: &RecipeContext, max: u32) -> Result<(), Error> {
    match ctx.settings.compiler().ok().and_then(|c| c.cppstd) {
        Some(cppstd) if cppstd_at_least(cppstd, max) && cppstd != max => Err(invalid(
            ctx,
            format!("supports up to C++{max}, profile provides C++{cppstd}"),
        )),
        _ => Ok(()),
    }
}

/// Fail when the profile's C standard is below `min`
///
/// # Errors
///
/// Returns `ConfigurationInvalid` when `compiler.cstd` is unset or lower
/// than the requirement.
pub fn check_min_cstd(ctx: &RecipeContext, min: u32) -> Result<(), Error> {
    match ctx.settings.compiler().ok().and_then(|c| c.cstd) {
        Some(cstd) if cstd_at_least(cstd, min) => Ok(()),
        Some(cstd) => Err(invalid(
            ctx,
            format!("requires C{min}, profile provides C{cstd}"),
        )),
        None => Err(invalid(
            ctx,
            format!("requires C{min}, profile does not declare compiler.cstd"),
        )),
    }
}

// Standards are year tags: 98 and 99 predate the two-digit 2000s tags
fn cppstd_at_least(have: u32, want: u32) -> bool {
    normalize_std(have) >= normalize_std(want)
}

fn cstd_at_least(have: u32, want: u32) -> bool {
    normalize_std(have) >= normalize_std(want)
}

fn normalize_std(std: u32) -> u32 {
    if std >= 90 {
        std + 1900
    } else {
        std + 2000
    }
}

/// Whether the profile compiler is MSVC
#[must_use]
pub fn is_msvc(settings: &Settings) -> bool {
    settings
        .compiler
        .as_ref()
        .is_some_and(|c| c.kind == CompilerKind::Msvc)
}

/// Whether MSVC links the static runtime (MT/MTd)
#[must_use]
pub fn is_msvc_static_runtime(settings: &Settings) -> bool {
    settings
        .compiler
        .as_ref()
        .and_then(|c| c.runtime)
        .is_some_and(|r| r.is_static())
}

/// Whether the target is an Apple platform
#[must_use]
pub fn is_apple_os(settings: &Settings) -> bool {
    settings.os.is_some_and(|os| os.is_apple())
}

/// Whether the build machine differs from the target machine
#[must_use]
pub fn cross_building(ctx: &RecipeContext) -> bool {
    !ctx.settings_build.same_machine_as(&ctx.settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn std_year_normalization() {
        assert!(cppstd_at_least(11, 98));
        assert!(cppstd_at_least(20, 17));
        assert!(!cppstd_at_least(98, 11));
        assert!(cstd_at_least(11, 99));
        assert!(!cstd_at_least(99, 11));
    }
}
