//! Dependency resolution error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum ResolveError {
    #[error("build requirement '{name}' cannot be resolved")]
    BuildRequirementMissing { name: String },

    #[error("dependency '{name}' is not part of the resolved graph")]
    DependencyMissing { name: String },

    #[error("no version of '{name}' satisfies {range}")]
    NoMatchingVersion { name: String, range: String },

    #[error(
        "conflicting values for option '{option}' of '{name}': '{first}' vs '{second}' \
         (neither requirement is forced)"
    )]
    OptionConflict {
        name: String,
        option: String,
        first: String,
        second: String,
    },

    #[error("options overlay on '{name}' was not honored: {message}")]
    OverlayNotSatisfied { name: String, message: String },
}

impl UserFacingError for ResolveError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::BuildRequirementMissing { .. } => {
                Some("Make the tool package available to the build-context profile.")
            }
            Self::OptionConflict { .. } => {
                Some("Align the requested option values, or mark one requirement as forced.")
            }
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::BuildRequirementMissing { .. } => "resolve.build_requirement_missing",
            Self::DependencyMissing { .. } => "resolve.dependency_missing",
            Self::NoMatchingVersion { .. } => "resolve.no_matching_version",
            Self::OptionConflict { .. } => "resolve.option_conflict",
            Self::OverlayNotSatisfied { .. } => "resolve.overlay_not_satisfied",
        };
        Some(code)
    }
}
