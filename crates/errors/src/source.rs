//! Source acquisition error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum SourceError {
    #[error("fetch failed: {url}: {message}")]
    FetchFailed { url: String, message: String },

    #[error("hash mismatch for {file}: expected {expected}, got {actual}")]
    HashMismatch {
        file: String,
        expected: String,
        actual: String,
    },

    #[error("extraction failed: {message}")]
    ExtractionFailed { message: String },

    #[error("unsupported archive format: {filename}")]
    UnsupportedArchiveFormat { filename: String },

    #[error("patch '{patch}' did not apply: {message}")]
    PatchFailed { patch: String, message: String },

    #[error("pattern not found in {file}: {needle}")]
    NeedleNotFound { file: String, needle: String },

    #[error("no source entry for version {version}")]
    NoSourceForVersion { version: String },
}

impl UserFacingError for SourceError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::FetchFailed { .. } => {
                Some("Check network access or mirror availability, then retry.")
            }
            Self::HashMismatch { .. } => {
                Some("Update the manifest digest if upstream re-published the archive.")
            }
            Self::PatchFailed { .. } | Self::NeedleNotFound { .. } => {
                Some("Rebase the patch onto the current upstream sources.")
            }
            Self::NoSourceForVersion { .. } => {
                Some("Add the version to the recipe's manifest sidecar.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::FetchFailed { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::FetchFailed { .. } => "source.fetch_failed",
            Self::HashMismatch { .. } => "source.hash_mismatch",
            Self::ExtractionFailed { .. } => "source.extraction_failed",
            Self::UnsupportedArchiveFormat { .. } => "source.unsupported_archive_format",
            Self::PatchFailed { .. } => "source.patch_failed",
            Self::NeedleNotFound { .. } => "source.needle_not_found",
            Self::NoSourceForVersion { .. } => "source.no_source_for_version",
        };
        Some(code)
    }
}
