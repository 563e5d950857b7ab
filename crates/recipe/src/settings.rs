//! Resolved profile settings as seen by one recipe
//!
//! Settings come from the host profile; a recipe may narrow them (dropping
//! C++ sub-settings when it only compiles C) or erase individual leaves that
//! do not affect its binary identity. Erasure is safe-removal: erasing an
//! absent leaf is a no-op.

use ferrite_errors::{Error, RecipeError};
use ferrite_types::{Arch, BuildType, CompilerKind, Libcxx, MsvcRuntime, Os};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Compiler sub-settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerSettings {
    pub kind: CompilerKind,
    pub version: Option<String>,
    pub libcxx: Option<Libcxx>,
    /// C++ standard as a year number (11, 14, 17, 20, 23)
    pub cppstd: Option<u32>,
    /// C standard as a year number (99, 11, 17)
    pub cstd: Option<u32>,
    pub runtime: Option<MsvcRuntime>,
}

impl CompilerSettings {
    /// Bare compiler with no sub-settings populated
    #[must_use]
    pub fn new(kind: CompilerKind) -> Self {
        Self {
            kind,
            version: None,
            libcxx: None,
            cppstd: None,
            cstd: None,
            runtime: None,
        }
    }
}

/// CUDA toolkit sub-settings, present only in CUDA profiles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CudaSettings {
    pub version: String,
}

/// The settings tuple of one profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub os: Option<Os>,
    pub arch: Option<Arch>,
    pub compiler: Option<CompilerSettings>,
    pub build_type: Option<BuildType>,
    pub cuda: Option<CudaSettings>,
}

impl Settings {
    /// Target OS
    ///
    /// # Errors
    ///
    /// Returns `SettingMissing` when the profile does not populate it.
    pub fn os(&self) -> Result<Os, Error> {
        self.os.ok_or_else(|| missing("os"))
    }

    /// Target architecture
    ///
    /// # Errors
    ///
    /// Returns `SettingMissing` when the profile does not populate it.
    pub fn arch(&self) -> Result<Arch, Error> {
        self.arch.ok_or_else(|| missing("arch"))
    }

    /// Compiler block
    ///
    /// # Errors
    ///
    /// Returns `SettingMissing` when the profile does not populate it.
    pub fn compiler(&self) -> Result<&CompilerSettings, Error> {
        self.compiler.as_ref().ok_or_else(|| missing("compiler"))
    }

    /// Build configuration
    ///
    /// # Errors
    ///
    /// Returns `SettingMissing` when the profile does not populate it.
    pub fn build_type(&self) -> Result<BuildType, Error> {
        self.build_type.ok_or_else(|| missing("build_type"))
    }

    /// Erase `compiler.libcxx`; no-op when absent
    pub fn rm_compiler_libcxx(&mut self) {
        if let Some(compiler) = &mut self.compiler {
            compiler.libcxx = None;
        }
    }

    /// Erase `compiler.cppstd`; no-op when absent
    pub fn rm_compiler_cppstd(&mut self) {
        if let Some(compiler) = &mut self.compiler {
            compiler.cppstd = None;
        }
    }

    /// Erase `compiler.cstd`; no-op when absent
    pub fn rm_compiler_cstd(&mut self) {
        if let Some(compiler) = &mut self.compiler {
            compiler.cstd = None;
        }
    }

    /// Whether build and host profiles describe different machines
    #[must_use]
    pub fn same_machine_as(&self, other: &Settings) -> bool {
        self.os == other.os && self.arch == other.arch
    }

    /// Flatten the populated leaves into identity fields
    ///
    /// Keys use dotted paths (`compiler.version`); only populated leaves
    /// appear, so erased sub-settings drop out of the binary identity.
    #[must_use]
    pub fn identity_leaves(&self) -> BTreeMap<String, String> {
        let mut leaves = BTreeMap::new();
        if let Some(os) = self.os {
            leaves.insert("os".to_string(), os.to_string());
        }
        if let Some(arch) = self.arch {
            leaves.insert("arch".to_string(), arch.to_string());
        }
        if let Some(compiler) = &self.compiler {
            leaves.insert("compiler".to_string(), compiler.kind.to_string());
            if let Some(version) = &compiler.version {
                leaves.insert("compiler.version".to_string(), version.clone());
            }
            if let Some(libcxx) = compiler.libcxx {
                leaves.insert("compiler.libcxx".to_string(), libcxx.to_string());
            }
            if let Some(cppstd) = compiler.cppstd {
                leaves.insert("compiler.cppstd".to_string(), cppstd.to_string());
            }
            if let Some(cstd) = compiler.cstd {
                leaves.insert("compiler.cstd".to_string(), cstd.to_string());
            }
            if let Some(runtime) = compiler.runtime {
                leaves.insert("compiler.runtime".to_string(), runtime.to_string());
            }
        }
        if let Some(build_type) = self.build_type {
            leaves.insert("build_type".to_string(), build_type.to_string());
        }
        if let Some(cuda) = &self.cuda {
            leaves.insert("cuda.version".to_string(), cuda.version.clone());
        }
        leaves
    }
}

fn missing(setting: &str) -> Error {
    RecipeError::SettingMissing {
        setting: setting.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linux_gcc() -> Settings {
        Settings {
            os: Some(Os::Linux),
            arch: Some(Arch::X86_64),
            compiler: Some(CompilerSettings {
                kind: CompilerKind::Gcc,
                version: Some("13".to_string()),
                libcxx: Some(Libcxx::Libstdcxx11),
                cppstd: Some(17),
                cstd: None,
                runtime: None,
            }),
            build_type: Some(BuildType::Release),
            cuda: None,
        }
    }

    #[test]
    fn identity_leaves_flatten_populated_fields() {
        let leaves = linux_gcc().identity_leaves();
        assert_eq!(leaves.get("os").map(String::as_str), Some("Linux"));
        assert_eq!(
            leaves.get("compiler.libcxx").map(String::as_str),
            Some("libstdc++11")
        );
        assert!(!leaves.contains_key("compiler.cstd"));
    }

    #[test]
    fn erasure_drops_leaves_from_identity() {
        let mut settings = linux_gcc();
        settings.rm_compiler_libcxx();
        settings.rm_compiler_cppstd();
        let leaves = settings.identity_leaves();
        assert!(!leaves.contains_key("compiler.libcxx"));
        assert!(!leaves.contains_key("compiler.cppstd"));
        assert!(leaves.contains_key("compiler.version"));
    }

    #[test]
    fn missing_setting_is_an_error() {
        let settings = Settings::default();
        assert!(settings.os().is_err());
        assert!(settings.compiler().is_err());
    }
}
