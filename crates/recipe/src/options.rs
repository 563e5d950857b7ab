//! Recipe options with declared domains and erasure
//!
//! An option is always in one of two states after configure: set to a value
//! inside its declared domain, or explicitly erased. "Never declared" is the
//! absence of the entry - the two must not be conflated, because identity
//! computation needs to see which options were declared and then removed.

use ferrite_errors::{Error, RecipeError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A concrete option value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl OptionValue {
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for OptionValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

/// Declared domain of an option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionDomain {
    /// Finite set of admissible values
    Choices(Vec<OptionValue>),
    /// The `ANY` sentinel: every value is admissible
    Any,
}

impl OptionDomain {
    /// The boolean domain `{true, false}`
    #[must_use]
    pub fn boolean() -> Self {
        Self::Choices(vec![OptionValue::Bool(true), OptionValue::Bool(false)])
    }

    /// Domain of enumerated strings
    #[must_use]
    pub fn strings(choices: &[&str]) -> Self {
        Self::Choices(choices.iter().map(|s| OptionValue::from(*s)).collect())
    }

    /// Check whether a value is admissible
    #[must_use]
    pub fn admits(&self, value: &OptionValue) -> bool {
        match self {
            Self::Any => true,
            Self::Choices(choices) => choices.contains(value),
        }
    }
}

/// Declaration of a single option: domain, default, description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionDecl {
    pub domain: OptionDomain,
    pub default: OptionValue,
    pub description: Option<String>,
}

impl OptionDecl {
    /// Boolean option with a default
    #[must_use]
    pub fn boolean(default: bool) -> Self {
        Self {
            domain: OptionDomain::boolean(),
            default: OptionValue::Bool(default),
            description: None,
        }
    }

    /// Enumerated string option with a default
    #[must_use]
    pub fn strings(choices: &[&str], default: &str) -> Self {
        Self {
            domain: OptionDomain::strings(choices),
            default: OptionValue::from(default),
            description: None,
        }
    }

    /// Attach a human description
    #[must_use]
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum OptionState {
    Set(OptionValue),
    Erased,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OptionEntry {
    decl: OptionDecl,
    state: OptionState,
}

/// The option map of a recipe
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Options {
    entries: BTreeMap<String, OptionEntry>,
}

impl Options {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an option, initialized to its default
    pub fn declare(&mut self, name: impl Into<String>, decl: OptionDecl) {
        let default = decl.default.clone();
        self.entries.insert(
            name.into(),
            OptionEntry {
                decl,
                state: OptionState::Set(default),
            },
        );
    }

    /// Current value of an option
    ///
    /// # Errors
    ///
    /// Returns `UnknownOption` for a never-declared name and `OptionErased`
    /// for an erased one.
    pub fn get(&self, name: &str) -> Result<&OptionValue, Error> {
        let entry = self.entries.get(name).ok_or_else(|| RecipeError::UnknownOption {
            option: name.to_string(),
        })?;
        match &entry.state {
            OptionState::Set(value) => Ok(value),
            OptionState::Erased => Err(RecipeError::OptionErased {
                option: name.to_string(),
            }
            .into()),
        }
    }

    /// Boolean value of an option; `None` when absent or erased
    #[must_use]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).ok().and_then(OptionValue::as_bool)
    }

    /// String value of an option; `None` when absent or erased
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).ok().and_then(OptionValue::as_str)
    }

    /// Set an option to a value inside its declared domain
    ///
    /// # Errors
    ///
    /// Returns `UnknownOption` for a never-declared name and
    /// `OptionOutOfDomain` when the value is not admissible.
    pub fn set(&mut self, name: &str, value: impl Into<OptionValue>) -> Result<(), Error> {
        let value = value.into();
        let entry = self
            .entries
            .get_mut(name)
            .ok_or_else(|| RecipeError::UnknownOption {
                option: name.to_string(),
            })?;
        if !entry.decl.domain.admits(&value) {
            return Err(RecipeError::OptionOutOfDomain {
                option: name.to_string(),
                value: value.to_string(),
            }
            .into());
        }
        entry.state = OptionState::Set(value);
        Ok(())
    }

    /// Erase an option from both behavior and identity
    ///
    /// A no-op when the option was never declared, matching the safe-removal
    /// semantics recipes rely on inside `configure`.
    pub fn rm_safe(&mut self, name: &str) {
        if let Some(entry) = self.entries.get_mut(name) {
            entry.state = OptionState::Erased;
        }
    }

    /// Whether an option was declared and then erased
    #[must_use]
    pub fn is_erased(&self, name: &str) -> bool {
        matches!(
            self.entries.get(name),
            Some(OptionEntry {
                state: OptionState::Erased,
                ..
            })
        )
    }

    /// Whether a name was ever declared, erased or not
    #[must_use]
    pub fn is_declared(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterate over live (non-erased) options in name order
    pub fn iter_set(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().filter_map(|(name, entry)| match &entry.state {
            OptionState::Set(value) => Some((name.as_str(), value)),
            OptionState::Erased => None,
        })
    }

    /// Verify every non-erased option holds a value inside its domain
    ///
    /// # Errors
    ///
    /// Returns `OptionOutOfDomain` naming the first violation.
    pub fn validate(&self) -> Result<(), Error> {
        for (name, entry) in &self.entries {
            if let OptionState::Set(value) = &entry.state {
                if !entry.decl.domain.admits(value) {
                    return Err(RecipeError::OptionOutOfDomain {
                        option: name.clone(),
                        value: value.to_string(),
                    }
                    .into());
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrite_errors::Error;

    fn sample() -> Options {
        let mut opts = Options::new();
        opts.declare("shared", OptionDecl::boolean(false));
        opts.declare("fPIC", OptionDecl::boolean(true));
        opts.declare(
            "backend",
            OptionDecl::strings(&["openssl", "mbedtls"], "openssl"),
        );
        opts
    }

    #[test]
    fn defaults_apply_on_declare() {
        let opts = sample();
        assert_eq!(opts.get_bool("shared"), Some(false));
        assert_eq!(opts.get_str("backend"), Some("openssl"));
    }

    #[test]
    fn domain_is_enforced() {
        let mut opts = sample();
        assert!(opts.set("backend", "gnutls").is_err());
        assert!(opts.set("backend", "mbedtls").is_ok());
    }

    #[test]
    fn erased_is_distinct_from_undeclared() {
        let mut opts = sample();
        opts.rm_safe("fPIC");
        assert!(opts.is_erased("fPIC"));
        assert!(opts.is_declared("fPIC"));
        assert!(!opts.is_declared("never_there"));
        assert!(matches!(
            opts.get("fPIC"),
            Err(Error::Recipe(RecipeError::OptionErased { .. }))
        ));
    }

    #[test]
    fn rm_safe_on_undeclared_is_noop() {
        let mut opts = sample();
        opts.rm_safe("nonexistent");
        assert!(!opts.is_declared("nonexistent"));
    }

    #[test]
    fn iter_skips_erased() {
        let mut opts = sample();
        opts.rm_safe("shared");
        let names: Vec<&str> = opts.iter_set().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["backend", "fPIC"]);
    }
}
