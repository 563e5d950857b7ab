//! Event severity and its mapping onto tracing

use serde::{Deserialize, Serialize};
use tracing::Level;

/// Severity used for routing events to logging systems
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl EventLevel {
    /// Convert into a tracing level for downstream logging
    #[must_use]
    pub fn tracing_level(&self) -> Level {
        match self {
            Self::Debug => Level::DEBUG,
            Self::Info => Level::INFO,
            Self::Warning => Level::WARN,
            Self::Error => Level::ERROR,
        }
    }
}
