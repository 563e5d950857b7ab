//! Requirement edges and resolved dependency handles
//!
//! A recipe contributes directed edges to the dependency graph; the host
//! resolves them into concrete packages before `generate` runs. Edges carry
//! four orthogonal traits (`transitive_headers`, `transitive_libs`,
//! `visible`, `run`) plus an options overlay imposed on the dependency.

use crate::cpp_info::CppInfo;
use crate::options::OptionValue;
use ferrite_errors::{Error, ResolveError, VersionError};
use ferrite_types::{RecipeRef, Version, VersionRange};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Which bucket an edge was appended to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequirementKind {
    /// Regular host-context dependency
    Requires,
    /// Build-context tool, resolved against the build machine profile
    ToolRequires,
    /// Build-context dependency that is not a tool (legacy bucket)
    BuildRequires,
    /// Host-context dependency visible to tests only
    TestRequires,
}

impl RequirementKind {
    /// Whether edges of this kind resolve in the build context
    #[must_use]
    pub fn is_build_context(&self) -> bool {
        matches!(self, Self::ToolRequires | Self::BuildRequires)
    }
}

/// One directed dependency edge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementEdge {
    pub name: String,
    pub range: VersionRange,
    pub kind: RequirementKind,
    pub transitive_headers: bool,
    pub transitive_libs: bool,
    pub visible: bool,
    pub run: bool,
    /// Wins option conflicts against non-forced edges
    pub force: bool,
    /// Option values imposed on the dependency
    pub options: BTreeMap<String, OptionValue>,
}

impl RequirementEdge {
    /// Edge with the defaults of its bucket
    #[must_use]
    pub fn new(name: impl Into<String>, range: VersionRange, kind: RequirementKind) -> Self {
        let build_context = kind.is_build_context();
        Self {
            name: name.into(),
            range,
            kind,
            transitive_headers: !build_context,
            transitive_libs: !build_context,
            visible: !build_context,
            run: build_context,
            force: false,
            options: BTreeMap::new(),
        }
    }

    /// Parse a `name/[range]` or `name/version` spec into an edge
    ///
    /// # Errors
    ///
    /// Returns a `VersionError` when the spec has no `/` or the range part
    /// does not parse.
    pub fn parse(spec: &str, kind: RequirementKind) -> Result<Self, Error> {
        let (name, version_part) =
            spec.split_once('/')
                .ok_or_else(|| VersionError::ParseError {
                    input: spec.to_string(),
                })?;
        let range = if version_part.starts_with('[') {
            VersionRange::parse(version_part)?
        } else {
            VersionRange::exact(Version::parse(version_part)?)
        };
        Ok(Self::new(name, range, kind))
    }

    #[must_use]
    pub fn with_transitive_headers(mut self, value: bool) -> Self {
        self.transitive_headers = value;
        self
    }

    #[must_use]
    pub fn with_transitive_libs(mut self, value: bool) -> Self {
        self.transitive_libs = value;
        self
    }

    #[must_use]
    pub fn with_visible(mut self, value: bool) -> Self {
        self.visible = value;
        self
    }

    #[must_use]
    pub fn with_run(mut self, value: bool) -> Self {
        self.run = value;
        self
    }

    #[must_use]
    pub fn with_force(mut self, value: bool) -> Self {
        self.force = value;
        self
    }

    /// Impose an option value on the dependency
    #[must_use]
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }
}

/// Ordered edge set of one recipe
///
/// A later edge for the same `(name, kind)` replaces the earlier one, which
/// is how `build_requirements` overrides what `requirements` appended.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequirementSet {
    edges: Vec<RequirementEdge>,
}

impl RequirementSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an edge, replacing an earlier edge for the same name and kind
    pub fn add(&mut self, edge: RequirementEdge) {
        if let Some(existing) = self
            .edges
            .iter_mut()
            .find(|e| e.name == edge.name && e.kind == edge.kind)
        {
            *existing = edge;
        } else {
            self.edges.push(edge);
        }
    }

    /// All edges in append order
    #[must_use]
    pub fn edges(&self) -> &[RequirementEdge] {
        &self.edges
    }

    /// Edges of one bucket
    pub fn of_kind(&self, kind: RequirementKind) -> impl Iterator<Item = &RequirementEdge> {
        self.edges.iter().filter(move |e| e.kind == kind)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Combine option overlays several consumers impose on one dependency
///
/// Non-forced edges must agree; a forced edge wins over non-forced ones.
/// Two forced edges with different values are still a conflict.
///
/// # Errors
///
/// Returns `ResolveError::OptionConflict` naming the first disagreement.
pub fn combine_overlays(
    name: &str,
    edges: &[&RequirementEdge],
) -> Result<BTreeMap<String, OptionValue>, Error> {
    let mut combined: BTreeMap<String, (OptionValue, bool)> = BTreeMap::new();
    for edge in edges {
        for (option, value) in &edge.options {
            match combined.get_mut(option) {
                None => {
                    combined.insert(option.clone(), (value.clone(), edge.force));
                }
                Some((existing, existing_forced)) => {
                    if existing == value {
                        continue;
                    }
                    match (*existing_forced, edge.force) {
                        (false, true) => {
                            *existing = value.clone();
                            *existing_forced = true;
                        }
                        (true, false) => {}
                        _ => {
                            return Err(ResolveError::OptionConflict {
                                name: name.to_string(),
                                option: option.clone(),
                                first: existing.to_string(),
                                second: value.to_string(),
                            }
                            .into());
                        }
                    }
                }
            }
        }
    }
    Ok(combined
        .into_iter()
        .map(|(option, (value, _))| (option, value))
        .collect())
}

/// A dependency after resolution, as a recipe sees it
#[derive(Debug, Clone)]
pub struct ResolvedDependency {
    pub reference: RecipeRef,
    pub options: BTreeMap<String, OptionValue>,
    pub cpp_info: CppInfo,
    pub package_folder: PathBuf,
}

impl ResolvedDependency {
    /// Option value on the resolved dependency
    #[must_use]
    pub fn option(&self, name: &str) -> Option<&OptionValue> {
        self.options.get(name)
    }
}

/// Resolved dependency graph of one recipe, split by context
#[derive(Debug, Clone, Default)]
pub struct Dependencies {
    host: BTreeMap<String, ResolvedDependency>,
    build: BTreeMap<String, ResolvedDependency>,
}

impl Dependencies {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a host-context dependency (host side)
    pub fn insert_host(&mut self, dep: ResolvedDependency) {
        self.host.insert(dep.reference.name.clone(), dep);
    }

    /// Insert a build-context dependency (host side)
    pub fn insert_build(&mut self, dep: ResolvedDependency) {
        self.build.insert(dep.reference.name.clone(), dep);
    }

    /// Host-context dependency by name
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::DependencyMissing` when the name was never
    /// resolved into the graph.
    pub fn get(&self, name: &str) -> Result<&ResolvedDependency, Error> {
        self.host.get(name).ok_or_else(|| {
            ResolveError::DependencyMissing {
                name: name.to_string(),
            }
            .into()
        })
    }

    /// Build-context dependency by name
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::BuildRequirementMissing` when absent.
    pub fn get_build(&self, name: &str) -> Result<&ResolvedDependency, Error> {
        self.build.get(name).ok_or_else(|| {
            ResolveError::BuildRequirementMissing {
                name: name.to_string(),
            }
            .into()
        })
    }

    /// Iterate host-context dependencies in name order
    pub fn iter_host(&self) -> impl Iterator<Item = &ResolvedDependency> {
        self.host.values()
    }

    /// Iterate build-context dependencies in name order
    pub fn iter_build(&self) -> impl Iterator<Item = &ResolvedDependency> {
        self.build.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_range_spec() {
        let edge = RequirementEdge::parse("zlib/[>=1.2 <2]", RequirementKind::Requires).unwrap();
        assert_eq!(edge.name, "zlib");
        assert!(edge.range.matches(&Version::parse("1.3.1").unwrap()));
        assert!(edge.visible);
        assert!(!edge.run);
    }

    #[test]
    fn tool_edges_default_to_build_context() {
        let edge =
            RequirementEdge::parse("cmake/[>=3.25]", RequirementKind::ToolRequires).unwrap();
        assert!(edge.run);
        assert!(!edge.visible);
        assert!(!edge.transitive_headers);
    }

    #[test]
    fn later_edge_overrides_earlier() {
        let mut set = RequirementSet::new();
        set.add(RequirementEdge::parse("zlib/1.2.13", RequirementKind::Requires).unwrap());
        set.add(RequirementEdge::parse("zlib/1.3.1", RequirementKind::Requires).unwrap());
        assert_eq!(set.edges().len(), 1);
        assert!(set.edges()[0]
            .range
            .matches(&Version::parse("1.3.1").unwrap()));
    }

    #[test]
    fn overlay_conflict_is_hard_error() {
        let a = RequirementEdge::parse("openssl/[*]", RequirementKind::Requires)
            .unwrap()
            .with_option("shared", true);
        let b = RequirementEdge::parse("openssl/[*]", RequirementKind::Requires)
            .unwrap()
            .with_option("shared", false);
        assert!(combine_overlays("openssl", &[&a, &b]).is_err());
    }

    #[test]
    fn forced_overlay_wins() {
        let a = RequirementEdge::parse("openssl/[*]", RequirementKind::Requires)
            .unwrap()
            .with_option("shared", true);
        let b = RequirementEdge::parse("openssl/[*]", RequirementKind::Requires)
            .unwrap()
            .with_option("shared", false)
            .with_force(true);
        let combined = combine_overlays("openssl", &[&a, &b]).unwrap();
        assert_eq!(combined.get("shared"), Some(&OptionValue::Bool(false)));
    }
}
