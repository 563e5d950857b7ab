//! Build driver error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum BuildError {
    #[error("build failed: {message}")]
    Failed { message: String },

    #[error("configure failed: {message}")]
    ConfigureFailed { message: String },

    #[error("compile failed: {message}")]
    CompileFailed { message: String },

    #[error("install failed: {message}")]
    InstallFailed { message: String },

    #[error("required tool '{tool}' not found on PATH")]
    ToolMissing { tool: String },

    #[error("command '{command}' exited with {code:?}: {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("POSIX shell required but none is configured for this build")]
    ShellMissing,
}

impl UserFacingError for BuildError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::ToolMissing { .. } => {
                Some("Declare the tool as a build requirement or install it on the build host.")
            }
            Self::ShellMissing => {
                Some("Builds driven through win_bash need an msys2-style POSIX shell.")
            }
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::Failed { .. } => "build.failed",
            Self::ConfigureFailed { .. } => "build.configure_failed",
            Self::CompileFailed { .. } => "build.compile_failed",
            Self::InstallFailed { .. } => "build.install_failed",
            Self::ToolMissing { .. } => "build.tool_missing",
            Self::CommandFailed { .. } => "build.command_failed",
            Self::ShellMissing => "build.shell_missing",
        };
        Some(code)
    }
}
