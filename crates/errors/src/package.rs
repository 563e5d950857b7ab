//! Packaging and normalization error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum PackagingError {
    #[error("required artifact missing from install tree: {path}")]
    MissingArtifact { path: String },

    #[error("normalization pass '{pass}' failed: {message}")]
    NormalizationFailed { pass: String, message: String },

    #[error("no license file found and no extraction source declared")]
    LicenseMissing,

    #[error("license header block not found in {file}")]
    LicenseHeaderNotFound { file: String },

    #[error("package layout violated: {message}")]
    LayoutViolation { message: String },
}

impl UserFacingError for PackagingError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::MissingArtifact { .. } => {
                Some("Check the upstream install step; the expected file was never produced.")
            }
            Self::LicenseMissing | Self::LicenseHeaderNotFound { .. } => {
                Some("Point the recipe at the upstream license file or header block.")
            }
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::MissingArtifact { .. } => "packaging.missing_artifact",
            Self::NormalizationFailed { .. } => "packaging.normalization_failed",
            Self::LicenseMissing => "packaging.license_missing",
            Self::LicenseHeaderNotFound { .. } => "packaging.license_header_not_found",
            Self::LayoutViolation { .. } => "packaging.layout_violation",
        };
        Some(code)
    }
}
