//! Version and range parsing error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum VersionError {
    #[error("invalid version: {input}")]
    ParseError { input: String },

    #[error("invalid version range: {input}")]
    InvalidRange { input: String },

    #[error("invalid constraint '{constraint}' in range {range}")]
    InvalidConstraint { constraint: String, range: String },
}

impl UserFacingError for VersionError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::ParseError { .. } => "version.parse_error",
            Self::InvalidRange { .. } => "version.invalid_range",
            Self::InvalidConstraint { .. } => "version.invalid_constraint",
        };
        Some(code)
    }
}
