//! Environment blocks a package publishes
//!
//! Two separate blocks: `buildenv_info` applies when the package acts as a
//! tool during someone else's build, `runenv_info` applies when consumers
//! run binaries linked against it. The split is mandatory; generators render
//! each block into its own activation script.

use ferrite_types::Os;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One recorded environment operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnvOp {
    Define { name: String, value: String },
    DefinePath { name: String, value: String },
    Append { name: String, value: String },
    AppendPath { name: String, value: String },
    PrependPath { name: String, value: String },
}

/// Ordered list of environment operations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvBlock {
    ops: Vec<EnvOp>,
}

impl EnvBlock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a plain variable
    pub fn define(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.ops.push(EnvOp::Define {
            name: name.into(),
            value: value.into(),
        });
    }

    /// Overwrite a path-valued variable
    pub fn define_path(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.ops.push(EnvOp::DefinePath {
            name: name.into(),
            value: value.into(),
        });
    }

    /// Append to a plain variable (space separated)
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.ops.push(EnvOp::Append {
            name: name.into(),
            value: value.into(),
        });
    }

    /// Append a path list entry
    pub fn append_path(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.ops.push(EnvOp::AppendPath {
            name: name.into(),
            value: value.into(),
        });
    }

    /// Prepend a path list entry
    pub fn prepend_path(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.ops.push(EnvOp::PrependPath {
            name: name.into(),
            value: value.into(),
        });
    }

    /// Recorded operations in insertion order
    #[must_use]
    pub fn ops(&self) -> &[EnvOp] {
        &self.ops
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Apply the block on top of an existing environment
    ///
    /// Path lists join with the platform separator of `os`.
    pub fn apply(&self, os: Os, env: &mut BTreeMap<String, String>) {
        let sep = if os == Os::Windows { ';' } else { ':' };
        for op in &self.ops {
            match op {
                EnvOp::Define { name, value } | EnvOp::DefinePath { name, value } => {
                    env.insert(name.clone(), value.clone());
                }
                EnvOp::Append { name, value } => {
                    env.entry(name.clone())
                        .and_modify(|v| {
                            v.push(' ');
                            v.push_str(value);
                        })
                        .or_insert_with(|| value.clone());
                }
                EnvOp::AppendPath { name, value } => {
                    env.entry(name.clone())
                        .and_modify(|v| {
                            v.push(sep);
                            v.push_str(value);
                        })
                        .or_insert_with(|| value.clone());
                }
                EnvOp::PrependPath { name, value } => {
                    env.entry(name.clone())
                        .and_modify(|v| *v = format!("{value}{sep}{v}"))
                        .or_insert_with(|| value.clone());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_operations_respect_separator() {
        let mut block = EnvBlock::new();
        block.prepend_path("PATH", "/opt/tool/bin");
        let mut env = BTreeMap::from([("PATH".to_string(), "/usr/bin".to_string())]);
        block.apply(Os::Linux, &mut env);
        assert_eq!(env.get("PATH").unwrap(), "/opt/tool/bin:/usr/bin");

        let mut env = BTreeMap::from([("PATH".to_string(), "C:\\Windows".to_string())]);
        block.apply(Os::Windows, &mut env);
        assert_eq!(env.get("PATH").unwrap(), "/opt/tool/bin;C:\\Windows");
    }

    #[test]
    fn define_overwrites() {
        let mut block = EnvBlock::new();
        block.define("AUTOCONF", "autoconf");
        block.define("AUTOCONF", "autoconf-2.72");
        let mut env = BTreeMap::new();
        block.apply(Os::Linux, &mut env);
        assert_eq!(env.get("AUTOCONF").unwrap(), "autoconf-2.72");
    }
}
