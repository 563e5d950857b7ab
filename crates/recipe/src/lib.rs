#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! The recipe contract
//!
//! A recipe is one package definition: how to fetch, build, and publish one
//! upstream project. This crate provides the object model a recipe is built
//! from (options, settings, requirement edges, published metadata) and the
//! lifecycle driver that runs its hooks in the fixed order the contract
//! prescribes. The actual build work - generators, build drivers, package
//! normalization - lives in `ferrite-builder`; recipes call into it from
//! their hooks.

pub mod checks;
pub mod conf;
pub mod context;
pub mod cpp_info;
pub mod deps;
pub mod env;
pub mod layout;
pub mod lifecycle;
pub mod options;
pub mod package_id;
pub mod settings;

pub use checks::{
    check_max_cppstd, check_min_cppstd, check_min_cstd, cross_building, is_apple_os, is_msvc,
    is_msvc_static_runtime,
};
pub use conf::Conf;
pub use context::{RecipeContext, RunOutput};
pub use cpp_info::{Component, CppInfo, PropertyValue};
pub use deps::{
    combine_overlays, Dependencies, RequirementEdge, RequirementKind, RequirementSet,
    ResolvedDependency,
};
pub use env::{EnvBlock, EnvOp};
pub use layout::Layout;
pub use lifecycle::{
    apply_implements, CapturedPackage, LifecycleDriver, LifecycleState, NullResolver,
    PackageFolderState, Resolver, SourceCache,
};
pub use options::{OptionDecl, OptionDomain, OptionValue, Options};
pub use package_id::PackageIdInfo;
pub use settings::{CompilerSettings, CudaSettings, Settings};

use async_trait::async_trait;
use ferrite_errors::Error;
use ferrite_types::{PackageType, RecipeRef, Version};

/// Source languages a recipe compiles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    C,
    Cpp,
    Cuda,
    Fortran,
    Rust,
}

/// Well-known behaviors the driver auto-applies after `configure`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Implements {
    /// When `shared=True`, erase `fPIC`
    AutoSharedFpic,
    /// When `header_only=True`, erase `shared`/`fPIC` and repackage as a
    /// header library
    AutoHeaderOnly,
}

/// Declarative identity of a recipe
#[derive(Debug, Clone)]
pub struct RecipeMetadata {
    pub name: String,
    pub version: Version,
    pub description: String,
    pub license: String,
    pub homepage: Option<String>,
    pub topics: Vec<String>,
    pub package_type: PackageType,
    pub languages: Vec<Language>,
    pub implements: Vec<Implements>,
    /// Shared helper recipes injected at load time; their versions
    /// participate in the binary identity
    pub helper_injections: Vec<(String, String)>,
}

impl RecipeMetadata {
    /// Minimal metadata record
    #[must_use]
    pub fn new(name: &str, version: Version, license: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            version,
            description: description.to_string(),
            license: license.to_string(),
            homepage: None,
            topics: Vec::new(),
            package_type: PackageType::Library,
            languages: vec![Language::C, Language::Cpp],
            implements: Vec::new(),
            helper_injections: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_homepage(mut self, homepage: &str) -> Self {
        self.homepage = Some(homepage.to_string());
        self
    }

    #[must_use]
    pub fn with_topics(mut self, topics: &[&str]) -> Self {
        self.topics = topics.iter().map(ToString::to_string).collect();
        self
    }

    #[must_use]
    pub fn with_package_type(mut self, package_type: PackageType) -> Self {
        self.package_type = package_type;
        self
    }

    #[must_use]
    pub fn with_languages(mut self, languages: &[Language]) -> Self {
        self.languages = languages.to_vec();
        self
    }

    #[must_use]
    pub fn with_implements(mut self, implements: &[Implements]) -> Self {
        self.implements = implements.to_vec();
        self
    }

    /// Reference (`name/version`) of this recipe
    #[must_use]
    pub fn reference(&self) -> RecipeRef {
        RecipeRef::new(&self.name, self.version.clone())
    }
}

/// Metadata a recipe publishes for its consumers
#[derive(Debug, Clone, Default)]
pub struct PackageMetadata {
    pub cpp_info: CppInfo,
    /// Applied when this package acts as a tool in someone else's build
    pub buildenv_info: EnvBlock,
    /// Applied when consumers run binaries linked against this package
    pub runenv_info: EnvBlock,
}

/// One package definition
///
/// Hooks default to no-ops so a recipe only spells out the states it
/// participates in. The driver calls them in the lifecycle order exactly
/// once per package id; hooks must respect the per-state contracts
/// (`configure` mutates options but performs no I/O, `package_info` returns
/// metadata without touching the filesystem, and so on).
#[async_trait]
pub trait Recipe: Send + Sync {
    /// Declarative identity block
    fn metadata(&self) -> RecipeMetadata;

    /// Declare options and their domains
    fn declare_options(&self, _options: &mut Options) {}

    /// Export recipe-local files (patches) next to the sources
    fn export_sources(&self, _ctx: &mut RecipeContext) -> Result<(), Error> {
        Ok(())
    }

    /// Mutate own options and dependency option preferences; no I/O
    fn configure(&self, _ctx: &mut RecipeContext) -> Result<(), Error> {
        Ok(())
    }

    /// Reject unsupported configurations on the target
    fn validate(&self, _ctx: &RecipeContext) -> Result<(), Error> {
        Ok(())
    }

    /// Reject configurations that cannot be built on the build machine
    fn validate_build(&self, _ctx: &RecipeContext) -> Result<(), Error> {
        Ok(())
    }

    /// Bind folder roles; deterministic in options
    fn layout(&self, ctx: &RecipeContext) -> Layout {
        Layout::basic(ctx.base_folder())
    }

    /// Append host-context dependency edges
    fn requirements(&self, _ctx: &mut RecipeContext) -> Result<(), Error> {
        Ok(())
    }

    /// Append build-context dependency edges
    fn build_requirements(&self, _ctx: &mut RecipeContext) -> Result<(), Error> {
        Ok(())
    }

    /// Materialize a clean source tree; idempotent, settings-independent
    async fn source(&self, _ctx: &mut RecipeContext) -> Result<(), Error> {
        Ok(())
    }

    /// Write toolchain and dependency files under the generators folder
    async fn generate(&self, _ctx: &mut RecipeContext) -> Result<(), Error> {
        Ok(())
    }

    /// Drive the upstream build system
    async fn build(&self, _ctx: &mut RecipeContext) -> Result<(), Error> {
        Ok(())
    }

    /// Install into the package folder, then normalize
    async fn package(&self, _ctx: &mut RecipeContext) -> Result<(), Error> {
        Ok(())
    }

    /// Publish the component metadata consumers see
    fn package_info(&self, _ctx: &RecipeContext) -> Result<PackageMetadata, Error> {
        Ok(PackageMetadata::default())
    }

    /// Erase identity fields that must not influence the binary id
    fn package_id(&self, _info: &mut PackageIdInfo) -> Result<(), Error> {
        Ok(())
    }
}
