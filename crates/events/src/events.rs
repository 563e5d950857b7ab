//! Domain-driven event types
//!
//! Events are grouped by functional domain: lifecycle transitions, source
//! acquisition, build driver activity, and packaging.

use crate::meta::EventLevel;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level event type carried by the channel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", rename_all = "lowercase")]
pub enum AppEvent {
    General(GeneralEvent),
    Lifecycle(LifecycleEvent),
    Source(SourceEvent),
    Build(BuildEvent),
    Package(PackageEvent),
}

impl AppEvent {
    /// Severity of this event
    #[must_use]
    pub fn level(&self) -> EventLevel {
        match self {
            Self::General(GeneralEvent::Error { .. }) => EventLevel::Error,
            Self::General(GeneralEvent::Warning { .. })
            | Self::Package(PackageEvent::FileRemoved { .. }) => EventLevel::Warning,
            Self::General(GeneralEvent::Debug { .. })
            | Self::Build(BuildEvent::CommandStarted { .. }) => EventLevel::Debug,
            _ => EventLevel::Info,
        }
    }

    /// Forward the event to the tracing subscriber
    pub fn trace(&self) {
        match self.level() {
            EventLevel::Debug => tracing::debug!(event = ?self),
            EventLevel::Info => tracing::info!(event = ?self),
            EventLevel::Warning => tracing::warn!(event = ?self),
            EventLevel::Error => tracing::error!(event = ?self),
        }
    }
}

/// Generic messages not tied to a lifecycle state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GeneralEvent {
    Debug { message: String },
    Info { message: String },
    Warning { message: String },
    Error { message: String },
}

/// Lifecycle state machine transitions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LifecycleEvent {
    /// A lifecycle hook is about to run
    StateEntered { reference: String, state: String },
    /// A lifecycle hook finished
    StateCompleted { reference: String, state: String },
    /// The whole lifecycle finished and metadata was captured
    Completed {
        reference: String,
        package_id: String,
    },
}

/// Source acquisition activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SourceEvent {
    DownloadStarted { url: String },
    DownloadCompleted { url: String, bytes: u64 },
    Unpacked { archive: String, dest: PathBuf },
    PatchApplied { patch: String },
    CacheHit { reference: String },
}

/// Build driver activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BuildEvent {
    CommandStarted {
        reference: String,
        command: String,
        working_dir: PathBuf,
    },
    CommandCompleted {
        reference: String,
        command: String,
        exit_code: Option<i32>,
    },
    GeneratorWritten {
        generator: String,
        files: Vec<PathBuf>,
    },
    JobsReduced {
        requested: usize,
        effective: usize,
        reason: String,
    },
}

/// Packaging and normalization activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PackageEvent {
    InstallCompleted { reference: String },
    NormalizationPassRan { pass: String, changed: usize },
    FileRemoved { path: PathBuf, reason: String },
    LicenseCaptured { file: String },
    MetadataCaptured { reference: String, components: usize },
}
