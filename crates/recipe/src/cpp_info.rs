//! Published package metadata: the component tree downstream consumers see

use ferrite_errors::{Error, RecipeError};
use ferrite_types::{PackageType, RecipeRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Well-known property keys understood by the generators
pub mod properties {
    pub const CMAKE_FILE_NAME: &str = "cmake_file_name";
    pub const CMAKE_TARGET_NAME: &str = "cmake_target_name";
    pub const CMAKE_TARGET_ALIASES: &str = "cmake_target_aliases";
    pub const CMAKE_ADDITIONAL_VARIABLES_PREFIXES: &str = "cmake_additional_variables_prefixes";
    pub const CMAKE_BUILD_MODULES: &str = "cmake_build_modules";
    pub const PKG_CONFIG_NAME: &str = "pkg_config_name";
    pub const PKG_CONFIG_ALIASES: &str = "pkg_config_aliases";
    pub const SYSTEM_PACKAGE_VERSION: &str = "system_package_version";
}

/// Property values are either a single string or a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Str(String),
    List(Vec<String>),
}

impl PropertyValue {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            Self::List(_) => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> &[String] {
        match self {
            Self::Str(s) => std::slice::from_ref(s),
            Self::List(l) => l,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(l: Vec<String>) -> Self {
        Self::List(l)
    }
}

/// One node of the metadata tree: the root or a named component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    pub libs: Vec<String>,
    pub includedirs: Vec<String>,
    pub libdirs: Vec<String>,
    pub bindirs: Vec<String>,
    pub resdirs: Vec<String>,
    pub system_libs: Vec<String>,
    pub frameworks: Vec<String>,
    pub defines: Vec<String>,
    pub cflags: Vec<String>,
    pub cxxflags: Vec<String>,
    pub sharedlinkflags: Vec<String>,
    pub exelinkflags: Vec<String>,
    /// Other components this one links against, `component` within the same
    /// package or `pkg::component` across packages
    pub requires: Vec<String>,
    pub properties: BTreeMap<String, PropertyValue>,
}

impl Default for Component {
    fn default() -> Self {
        Self {
            libs: Vec::new(),
            includedirs: vec!["include".to_string()],
            libdirs: vec!["lib".to_string()],
            bindirs: vec!["bin".to_string()],
            resdirs: vec!["res".to_string()],
            system_libs: Vec::new(),
            frameworks: Vec::new(),
            defines: Vec::new(),
            cflags: Vec::new(),
            cxxflags: Vec::new(),
            sharedlinkflags: Vec::new(),
            exelinkflags: Vec::new(),
            requires: Vec::new(),
            properties: BTreeMap::new(),
        }
    }
}

impl Component {
    /// Set a well-known property
    pub fn set_property(&mut self, key: &str, value: impl Into<PropertyValue>) {
        self.properties.insert(key.to_string(), value.into());
    }

    /// Look up a property
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }
}

/// The published metadata tree of one package
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CppInfo {
    pub root: Component,
    components: BTreeMap<String, Component>,
}

impl CppInfo {
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Component::default(),
            components: BTreeMap::new(),
        }
    }

    /// Component by name, created on first access
    pub fn component_mut(&mut self, name: &str) -> &mut Component {
        self.components.entry(name.to_string()).or_default()
    }

    /// Component by name
    #[must_use]
    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.get(name)
    }

    /// Iterate components in name order
    pub fn components(&self) -> impl Iterator<Item = (&str, &Component)> {
        self.components.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn has_components(&self) -> bool {
        !self.components.is_empty()
    }

    /// `find_package` file name: the `cmake_file_name` property or the
    /// package name itself
    #[must_use]
    pub fn cmake_file_name(&self, package_name: &str) -> String {
        self.root
            .property(properties::CMAKE_FILE_NAME)
            .and_then(PropertyValue::as_str)
            .unwrap_or(package_name)
            .to_string()
    }

    /// Root CMake target, defaulting to `pkg::pkg`
    #[must_use]
    pub fn cmake_target_name(&self, package_name: &str) -> String {
        self.root
            .property(properties::CMAKE_TARGET_NAME)
            .and_then(PropertyValue::as_str)
            .map_or_else(
                || format!("{package_name}::{package_name}"),
                ToString::to_string,
            )
    }

    /// pkg-config name of a node, defaulting to the component (or package)
    /// name itself
    #[must_use]
    pub fn pkg_config_name<'a>(node: &'a Component, fallback: &'a str) -> &'a str {
        node.property(properties::PKG_CONFIG_NAME)
            .and_then(PropertyValue::as_str)
            .unwrap_or(fallback)
    }

    /// Check the metadata contract before the host captures it
    ///
    /// # Errors
    ///
    /// Returns `ContractViolation` when a component `requires` entry does not
    /// resolve, or when the root declares `libs` next to explicit components.
    pub fn validate(&self, reference: &RecipeRef, package_type: PackageType) -> Result<(), Error> {
        if self.has_components() && !self.root.libs.is_empty() {
            return Err(violation(
                reference,
                "root libs must be empty when components are declared",
            ));
        }
        if package_type == PackageType::HeaderLibrary && !self.root.libs.is_empty() {
            return Err(violation(reference, "header-library declares libs"));
        }
        for (name, component) in &self.components {
            for required in &component.requires {
                // Foreign references (pkg::component) resolve at graph level
                if required.contains("::") {
                    continue;
                }
                if !self.components.contains_key(required) {
                    return Err(violation(
                        reference,
                        &format!("component '{name}' requires unknown component '{required}'"),
                    ));
                }
            }
        }
        Ok(())
    }
}

fn violation(reference: &RecipeRef, message: &str) -> Error {
    RecipeError::ContractViolation {
        reference: reference.to_string(),
        message: message.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrite_types::Version;

    fn reference() -> RecipeRef {
        RecipeRef::new("cjson", Version::parse("1.7.18").unwrap())
    }

    #[test]
    fn target_name_defaults_to_double_name() {
        let info = CppInfo::new();
        assert_eq!(info.cmake_target_name("cjson"), "cjson::cjson");
    }

    #[test]
    fn explicit_target_name_wins() {
        let mut info = CppInfo::new();
        info.root
            .set_property(properties::CMAKE_TARGET_NAME, "Eigen3::Eigen");
        assert_eq!(info.cmake_target_name("eigen"), "Eigen3::Eigen");
    }

    #[test]
    fn dangling_component_requires_is_a_violation() {
        let mut info = CppInfo::new();
        info.component_mut("utils").requires.push("core".to_string());
        let err = info
            .validate(&reference(), PackageType::Library)
            .unwrap_err();
        assert!(err.to_string().contains("unknown component"));
    }

    #[test]
    fn foreign_requires_are_deferred() {
        let mut info = CppInfo::new();
        info.component_mut("utils")
            .requires
            .push("zlib::zlib".to_string());
        assert!(info.validate(&reference(), PackageType::Library).is_ok());
    }

    #[test]
    fn root_libs_conflict_with_components() {
        let mut info = CppInfo::new();
        info.root.libs.push("cjson".to_string());
        info.component_mut("utils");
        assert!(info.validate(&reference(), PackageType::Library).is_err());
    }
}
