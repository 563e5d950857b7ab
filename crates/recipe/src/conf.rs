//! Host configuration lookups
//!
//! A flat namespaced key-value store the host fills from its own config;
//! recipes only read it. Keys follow the `scope.section:key` convention.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Well-known configuration keys
pub mod keys {
    /// Parallel job count for external build tools
    pub const BUILD_JOBS: &str = "tools.build:jobs";
    /// Per-job peak memory budget, in megabytes, for the job governor
    pub const JOB_MEMORY_BUDGET_MB: &str = "tools.build:job_memory_budget_mb";
    /// Path of the POSIX shell used when `win_bash` is active
    pub const WIN_BASH_PATH: &str = "tools.microsoft.bash:path";
}

/// Read-only configuration handed to every recipe
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conf {
    values: BTreeMap<String, String>,
}

impl Conf {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a key (host side)
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Raw string lookup
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Integer lookup; `None` when absent or unparsable
    #[must_use]
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| v.parse().ok())
    }

    /// Boolean lookup; accepts `true`/`false`/`1`/`0`
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key) {
            Some("true" | "1") => Some(true),
            Some("false" | "0") => Some(false),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_lookups() {
        let mut conf = Conf::new();
        conf.set(keys::BUILD_JOBS, "8");
        conf.set("tools.build:verbose", "true");
        assert_eq!(conf.get_int(keys::BUILD_JOBS), Some(8));
        assert_eq!(conf.get_bool("tools.build:verbose"), Some(true));
        assert_eq!(conf.get_int("tools.build:absent"), None);
    }
}
