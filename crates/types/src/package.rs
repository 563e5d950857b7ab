//! Recipe reference and package classification types

use crate::Version;
use ferrite_errors::VersionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reference to a recipe: `name/version`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecipeRef {
    pub name: String,
    pub version: Version,
}

impl RecipeRef {
    /// Create a new recipe reference
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }

    /// Parse a reference of the form `name/version`
    ///
    /// # Errors
    ///
    /// Returns `VersionError::ParseError` when the input has no `/` separator
    /// or the version part does not parse.
    pub fn parse(s: &str) -> Result<Self, VersionError> {
        let (name, version) = s.split_once('/').ok_or_else(|| VersionError::ParseError {
            input: s.to_string(),
        })?;
        if name.is_empty() {
            return Err(VersionError::ParseError {
                input: s.to_string(),
            });
        }
        Ok(Self {
            name: name.to_string(),
            version: Version::parse(version)?,
        })
    }
}

impl FromStr for RecipeRef {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RecipeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

/// What kind of artifact a package publishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PackageType {
    /// Library whose linkage follows the `shared` option
    Library,
    SharedLibrary,
    StaticLibrary,
    HeaderLibrary,
    Application,
}

impl PackageType {
    /// Whether packages of this type ship compiled library artifacts
    #[must_use]
    pub fn has_link_artifacts(&self) -> bool {
        !matches!(self, Self::HeaderLibrary | Self::Application)
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Library => "library",
            Self::SharedLibrary => "shared-library",
            Self::StaticLibrary => "static-library",
            Self::HeaderLibrary => "header-library",
            Self::Application => "application",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reference() {
        let r = RecipeRef::parse("cjson/1.7.18").unwrap();
        assert_eq!(r.name, "cjson");
        assert_eq!(r.version.as_str(), "1.7.18");
        assert_eq!(r.to_string(), "cjson/1.7.18");
    }

    #[test]
    fn reject_bare_name() {
        assert!(RecipeRef::parse("cjson").is_err());
        assert!(RecipeRef::parse("/1.0").is_err());
    }
}
