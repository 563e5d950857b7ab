//! Binary identity computation
//!
//! The identity view starts as a flattened copy of the resolved settings and
//! options; the `package_id` hook erases the fields that must not influence
//! the binary identity, then the driver hashes what is left. Erasing here
//! never touches the behavioral state the build already used.

use crate::options::Options;
use crate::settings::Settings;
use ferrite_types::RecipeRef;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Mutable identity view handed to the `package_id` hook
#[derive(Debug, Clone)]
pub struct PackageIdInfo {
    name: String,
    version: String,
    settings: BTreeMap<String, String>,
    options: BTreeMap<String, String>,
    provides: Vec<String>,
    /// Shared helper recipes whose version participates in identity
    injections: BTreeMap<String, String>,
}

impl PackageIdInfo {
    /// Build the identity view from the resolved state
    #[must_use]
    pub fn new(reference: &RecipeRef, settings: &Settings, options: &Options) -> Self {
        Self {
            name: reference.name.clone(),
            version: reference.version.to_string(),
            settings: settings.identity_leaves(),
            options: options
                .iter_set()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            provides: Vec::new(),
            injections: BTreeMap::new(),
        }
    }

    /// Record what the package provides, part of identity
    pub fn set_provides(&mut self, provides: Vec<String>) {
        self.provides = provides;
    }

    /// Record a helper injection (name, version)
    pub fn add_injection(&mut self, name: impl Into<String>, version: impl Into<String>) {
        self.injections.insert(name.into(), version.into());
    }

    /// Erase a settings leaf and everything below it
    ///
    /// `rm_setting("compiler")` drops `compiler`, `compiler.version`,
    /// `compiler.libcxx`, and the rest of the subtree.
    pub fn rm_setting(&mut self, path: &str) {
        let prefix = format!("{path}.");
        self.settings
            .retain(|key, _| key != path && !key.starts_with(&prefix));
    }

    /// Erase an option from identity only
    pub fn rm_option(&mut self, name: &str) {
        self.options.remove(name);
    }

    /// Drop every setting and option: identity reduces to name+version
    ///
    /// The header-only escape hatch; helper injections survive because the
    /// generated content still depends on them.
    pub fn clear(&mut self) {
        self.settings.clear();
        self.options.clear();
    }

    /// Identity leaf present check (settings)
    #[must_use]
    pub fn has_setting(&self, path: &str) -> bool {
        self.settings.contains_key(path)
    }

    /// Identity option present check
    #[must_use]
    pub fn has_option(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    /// Compute the content-addressed package id
    #[must_use]
    pub fn compute(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.name.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.version.as_bytes());
        hasher.update([0u8]);
        for (key, value) in &self.settings {
            hasher.update(key.as_bytes());
            hasher.update([b'=']);
            hasher.update(value.as_bytes());
            hasher.update([0u8]);
        }
        for (key, value) in &self.options {
            hasher.update(key.as_bytes());
            hasher.update([b'=']);
            hasher.update(value.as_bytes());
            hasher.update([0u8]);
        }
        for provided in &self.provides {
            hasher.update(provided.as_bytes());
            hasher.update([0u8]);
        }
        for (key, value) in &self.injections {
            hasher.update(key.as_bytes());
            hasher.update([b'@']);
            hasher.update(value.as_bytes());
            hasher.update([0u8]);
        }
        format!("{:x}", hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::OptionDecl;
    use crate::settings::CompilerSettings;
    use ferrite_types::{Arch, BuildType, CompilerKind, Os, Version};

    fn reference() -> RecipeRef {
        RecipeRef::new("eigen", Version::parse("3.4.0").unwrap())
    }

    fn settings(compiler: CompilerKind) -> Settings {
        Settings {
            os: Some(Os::Linux),
            arch: Some(Arch::X86_64),
            compiler: Some(CompilerSettings::new(compiler)),
            build_type: Some(BuildType::Release),
            cuda: None,
        }
    }

    #[test]
    fn cleared_identity_depends_on_name_and_version_only() {
        let options = Options::new();
        let mut a = PackageIdInfo::new(&reference(), &settings(CompilerKind::Gcc), &options);
        let mut b = PackageIdInfo::new(&reference(), &settings(CompilerKind::Clang), &options);
        a.clear();
        b.clear();
        assert_eq!(a.compute(), b.compute());
    }

    #[test]
    fn rm_setting_erases_the_subtree() {
        let mut settings = settings(CompilerKind::Gcc);
        settings.compiler.as_mut().unwrap().version = Some("13".to_string());
        let info_settings = settings;
        let mut info = PackageIdInfo::new(&reference(), &info_settings, &Options::new());
        assert!(info.has_setting("compiler.version"));
        info.rm_setting("compiler");
        assert!(!info.has_setting("compiler"));
        assert!(!info.has_setting("compiler.version"));
        assert!(info.has_setting("os"));
    }

    #[test]
    fn erased_options_do_not_reach_identity() {
        let mut options = Options::new();
        options.declare("shared", OptionDecl::boolean(true));
        options.declare("fPIC", OptionDecl::boolean(true));
        options.rm_safe("fPIC");
        let info = PackageIdInfo::new(&reference(), &settings(CompilerKind::Gcc), &options);
        assert!(info.has_option("shared"));
        assert!(!info.has_option("fPIC"));
    }

    #[test]
    fn provides_participates_in_identity() {
        let options = Options::new();
        let base = PackageIdInfo::new(&reference(), &settings(CompilerKind::Gcc), &options);
        let mut with_provides = base.clone();
        with_provides.set_provides(vec!["blas".to_string()]);
        assert_ne!(base.compute(), with_provides.compute());
    }
}
