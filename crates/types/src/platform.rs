//! Platform enums a profile is built from

use serde::{Deserialize, Serialize};
use std::fmt;

/// Target operating system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Linux,
    Macos,
    Windows,
    FreeBsd,
    Android,
    Ios,
}

impl Os {
    /// Whether this is an Apple platform (install-name rules apply)
    #[must_use]
    pub fn is_apple(&self) -> bool {
        matches!(self, Self::Macos | Self::Ios)
    }

    /// Platform name as CMake's `CMAKE_SYSTEM_NAME` expects it
    #[must_use]
    pub fn cmake_system_name(&self) -> &'static str {
        match self {
            Self::Linux => "Linux",
            Self::Macos => "Darwin",
            Self::Windows => "Windows",
            Self::FreeBsd => "FreeBSD",
            Self::Android => "Android",
            Self::Ios => "iOS",
        }
    }

    /// Extension of shared libraries on this platform
    #[must_use]
    pub fn shared_lib_extension(&self) -> &'static str {
        match self {
            Self::Windows => "dll",
            Self::Macos | Self::Ios => "dylib",
            _ => "so",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Linux => "Linux",
            Self::Macos => "Macos",
            Self::Windows => "Windows",
            Self::FreeBsd => "FreeBSD",
            Self::Android => "Android",
            Self::Ios => "iOS",
        };
        write!(f, "{s}")
    }
}

/// Target architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    X86,
    #[serde(rename = "x86_64")]
    X86_64,
    Armv7,
    Armv8,
    Riscv64,
}

impl Arch {
    /// Architecture component of a GNU target triplet
    #[must_use]
    pub fn triplet_arch(&self) -> &'static str {
        match self {
            Self::X86 => "i686",
            Self::X86_64 => "x86_64",
            Self::Armv7 => "armv7",
            Self::Armv8 => "aarch64",
            Self::Riscv64 => "riscv64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::X86 => "x86",
            Self::X86_64 => "x86_64",
            Self::Armv7 => "armv7",
            Self::Armv8 => "armv8",
            Self::Riscv64 => "riscv64",
        };
        write!(f, "{s}")
    }
}

/// Compiler family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompilerKind {
    Gcc,
    Clang,
    AppleClang,
    Msvc,
}

impl fmt::Display for CompilerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Gcc => "gcc",
            Self::Clang => "clang",
            Self::AppleClang => "apple-clang",
            Self::Msvc => "msvc",
        };
        write!(f, "{s}")
    }
}

/// Build configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildType {
    Debug,
    Release,
    RelWithDebInfo,
    MinSizeRel,
}

impl BuildType {
    /// Name as CMake and Meson spell it
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "Debug",
            Self::Release => "Release",
            Self::RelWithDebInfo => "RelWithDebInfo",
            Self::MinSizeRel => "MinSizeRel",
        }
    }

    /// Whether debug information is kept in this configuration
    #[must_use]
    pub fn has_debug_info(&self) -> bool {
        matches!(self, Self::Debug | Self::RelWithDebInfo)
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// C++ standard library flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Libcxx {
    #[serde(rename = "libstdc++")]
    Libstdcxx,
    #[serde(rename = "libstdc++11")]
    Libstdcxx11,
    #[serde(rename = "libc++")]
    Libcxx,
}

impl fmt::Display for Libcxx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Libstdcxx => "libstdc++",
            Self::Libstdcxx11 => "libstdc++11",
            Self::Libcxx => "libc++",
        };
        write!(f, "{s}")
    }
}

/// MSVC runtime library selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MsvcRuntime {
    /// Static runtime, release
    MT,
    /// Dynamic runtime, release
    MD,
    /// Static runtime, debug
    MTd,
    /// Dynamic runtime, debug
    MDd,
}

impl MsvcRuntime {
    /// Whether the runtime is linked statically
    #[must_use]
    pub fn is_static(&self) -> bool {
        matches!(self, Self::MT | Self::MTd)
    }
}

impl fmt::Display for MsvcRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MT => "MT",
            Self::MD => "MD",
            Self::MTd => "MTd",
            Self::MDd => "MDd",
        };
        write!(f, "{s}")
    }
}
