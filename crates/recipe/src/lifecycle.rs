//! The lifecycle state machine
//!
//! The driver runs a recipe's hooks in a fixed, linear order, applies the
//! declared `implements` policies, resolves the dependency graph between the
//! requirement states and `generate`, tracks the package folder typestate,
//! and enforces the failure semantics: a build failure leaves the build
//! folder for inspection, a packaging failure removes the half-populated
//! package folder.

use crate::context::RecipeContext;
use crate::deps::{Dependencies, RequirementSet};
use crate::package_id::PackageIdInfo;
use crate::{Implements, Language, PackageMetadata, Recipe};
use ferrite_errors::{Error, ResolveError};
use ferrite_events::{AppEvent, EventEmitter, LifecycleEvent};
use ferrite_types::{PackageType, RecipeRef};
use std::collections::HashSet;
use std::fmt;

/// States of the machine, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LifecycleState {
    ExportSources,
    Configure,
    Validate,
    Layout,
    Requirements,
    BuildRequirements,
    Source,
    Generate,
    Build,
    Package,
    PackageInfo,
    PackageId,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ExportSources => "export_sources",
            Self::Configure => "configure",
            Self::Validate => "validate",
            Self::Layout => "layout",
            Self::Requirements => "requirements",
            Self::BuildRequirements => "build_requirements",
            Self::Source => "source",
            Self::Generate => "generate",
            Self::Build => "build",
            Self::Package => "package",
            Self::PackageInfo => "package_info",
            Self::PackageId => "package_id",
        };
        write!(f, "{s}")
    }
}

/// Typestate of the package folder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageFolderState {
    NonExistent,
    /// Upstream install ran, nothing normalized yet
    PopulatedRaw,
    /// Normalization passes ran
    PopulatedNormalized,
    /// Metadata captured; writes from here on are undefined
    Frozen,
}

/// Host-side resolution of a recipe's edge set
pub trait Resolver: Send + Sync {
    /// Resolve every edge into a concrete dependency
    ///
    /// # Errors
    ///
    /// Returns a `ResolveError` when an edge cannot be satisfied.
    fn resolve(&self, edges: &RequirementSet) -> Result<Dependencies, Error>;
}

/// Resolver for recipes without dependencies; errors on any edge
pub struct NullResolver;

impl Resolver for NullResolver {
    fn resolve(&self, edges: &RequirementSet) -> Result<Dependencies, Error> {
        match edges.edges().first() {
            None => Ok(Dependencies::new()),
            Some(edge) => Err(ResolveError::DependencyMissing {
                name: edge.name.clone(),
            }
            .into()),
        }
    }
}

/// Host-side source cache, shared across configurations
///
/// Keyed by `(name, version, patch digest)`; a populated key makes the
/// source state a no-op on subsequent runs.
#[derive(Debug, Default)]
pub struct SourceCache {
    populated: HashSet<String>,
}

impl SourceCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn key(reference: &RecipeRef, patch_digest: &str) -> String {
        format!("{reference}#{patch_digest}")
    }

    #[must_use]
    pub fn contains(&self, reference: &RecipeRef, patch_digest: &str) -> bool {
        self.populated.contains(&Self::key(reference, patch_digest))
    }

    pub fn mark(&mut self, reference: &RecipeRef, patch_digest: &str) {
        self.populated.insert(Self::key(reference, patch_digest));
    }
}

/// Result of a completed lifecycle run
#[derive(Debug)]
pub struct CapturedPackage {
    pub reference: RecipeRef,
    pub package_id: String,
    pub package_type: PackageType,
    pub metadata: PackageMetadata,
    pub folder_state: PackageFolderState,
}

/// Drives one recipe through the state machine
pub struct LifecycleDriver<'r> {
    resolver: &'r dyn Resolver,
    source_cache: SourceCache,
}

impl<'r> LifecycleDriver<'r> {
    #[must_use]
    pub fn new(resolver: &'r dyn Resolver) -> Self {
        Self {
            resolver,
            source_cache: SourceCache::new(),
        }
    }

    /// Reuse a cache that outlives this driver
    #[must_use]
    pub fn with_source_cache(mut self, cache: SourceCache) -> Self {
        self.source_cache = cache;
        self
    }

    /// Hand the source cache back to the host
    #[must_use]
    pub fn into_source_cache(self) -> SourceCache {
        self.source_cache
    }

    /// Run the full lifecycle for one recipe
    ///
    /// # Errors
    ///
    /// Propagates the first hook failure after applying the per-state
    /// cleanup semantics.
    pub async fn run(
        &mut self,
        recipe: &dyn Recipe,
        mut ctx: RecipeContext,
    ) -> Result<CapturedPackage, Error> {
        let metadata = recipe.metadata();
        let reference = metadata.reference();
        let mut package_type = metadata.package_type;

        // Narrow settings before any hook observes them
        if !metadata.languages.contains(&Language::Cpp) {
            ctx.settings.rm_compiler_libcxx();
            ctx.settings.rm_compiler_cppstd();
        }

        recipe.declare_options(&mut ctx.options);

        self.enter(&ctx, &reference, LifecycleState::ExportSources);
        recipe.export_sources(&mut ctx)?;
        self.leave(&ctx, &reference, LifecycleState::ExportSources);

        self.enter(&ctx, &reference, LifecycleState::Configure);
        recipe.configure(&mut ctx)?;
        package_type = apply_implements(&metadata.implements, &mut ctx, package_type);
        ctx.options.validate()?;
        self.leave(&ctx, &reference, LifecycleState::Configure);

        self.enter(&ctx, &reference, LifecycleState::Validate);
        recipe.validate(&ctx)?;
        recipe.validate_build(&ctx)?;
        self.leave(&ctx, &reference, LifecycleState::Validate);

        self.enter(&ctx, &reference, LifecycleState::Layout);
        let layout = recipe.layout(&ctx);
        ctx.set_layout(layout);
        self.leave(&ctx, &reference, LifecycleState::Layout);

        self.enter(&ctx, &reference, LifecycleState::Requirements);
        recipe.requirements(&mut ctx)?;
        self.leave(&ctx, &reference, LifecycleState::Requirements);

        self.enter(&ctx, &reference, LifecycleState::BuildRequirements);
        recipe.build_requirements(&mut ctx)?;
        self.leave(&ctx, &reference, LifecycleState::BuildRequirements);

        ctx.dependencies = self.resolver.resolve(ctx.requirements())?;

        self.enter(&ctx, &reference, LifecycleState::Source);
        let patch_digest = ctx.manifest.patch_digest(reference.version.as_str());
        if self.source_cache.contains(&reference, &patch_digest) {
            ctx.emit(AppEvent::Source(ferrite_events::SourceEvent::CacheHit {
                reference: reference.to_string(),
            }));
        } else {
            recipe.source(&mut ctx).await?;
            self.source_cache.mark(&reference, &patch_digest);
        }
        self.leave(&ctx, &reference, LifecycleState::Source);

        self.enter(&ctx, &reference, LifecycleState::Generate);
        recipe.generate(&mut ctx).await?;
        self.leave(&ctx, &reference, LifecycleState::Generate);

        self.enter(&ctx, &reference, LifecycleState::Build);
        // A failure here deliberately leaves the build folder for inspection
        recipe.build(&mut ctx).await?;
        self.leave(&ctx, &reference, LifecycleState::Build);

        self.enter(&ctx, &reference, LifecycleState::Package);
        // Folder typestate: NonExistent -> PopulatedRaw after the upstream
        // install, PopulatedNormalized once the recipe's cleanup ran
        tokio::fs::create_dir_all(ctx.package_folder()).await?;
        if let Err(err) = recipe.package(&mut ctx).await {
            // Half-populated package trees are never left behind
            let _ = tokio::fs::remove_dir_all(ctx.package_folder()).await;
            return Err(err);
        }
        self.leave(&ctx, &reference, LifecycleState::Package);

        self.enter(&ctx, &reference, LifecycleState::PackageInfo);
        let package_metadata = recipe.package_info(&ctx)?;
        package_metadata.cpp_info.validate(&reference, package_type)?;
        let folder_state = PackageFolderState::Frozen;
        self.leave(&ctx, &reference, LifecycleState::PackageInfo);

        self.enter(&ctx, &reference, LifecycleState::PackageId);
        let mut id_info = PackageIdInfo::new(&reference, &ctx.settings, &ctx.options);
        id_info.set_provides(ctx.provides().to_vec());
        for (name, version) in &metadata.helper_injections {
            id_info.add_injection(name.clone(), version.clone());
        }
        recipe.package_id(&mut id_info)?;
        let package_id = id_info.compute();
        self.leave(&ctx, &reference, LifecycleState::PackageId);

        ctx.emit(AppEvent::Lifecycle(LifecycleEvent::Completed {
            reference: reference.to_string(),
            package_id: package_id.clone(),
        }));

        Ok(CapturedPackage {
            reference,
            package_id,
            package_type,
            metadata: package_metadata,
            folder_state,
        })
    }

    fn enter(&self, ctx: &RecipeContext, reference: &RecipeRef, state: LifecycleState) {
        ctx.emit(AppEvent::Lifecycle(LifecycleEvent::StateEntered {
            reference: reference.to_string(),
            state: state.to_string(),
        }));
    }

    fn leave(&self, ctx: &RecipeContext, reference: &RecipeRef, state: LifecycleState) {
        ctx.emit(AppEvent::Lifecycle(LifecycleEvent::StateCompleted {
            reference: reference.to_string(),
            state: state.to_string(),
        }));
    }
}

/// Apply the declared `implements` policies, as the driver does right after
/// `configure` returns; yields the effective package type
pub fn apply_implements(
    implements: &[Implements],
    ctx: &mut RecipeContext,
    package_type: PackageType,
) -> PackageType {
    let mut effective = package_type;
    for policy in implements {
        match policy {
            Implements::AutoSharedFpic => {
                if ctx.options.get_bool("shared") == Some(true) {
                    ctx.options.rm_safe("fPIC");
                }
            }
            Implements::AutoHeaderOnly => {
                if ctx.options.get_bool("header_only") == Some(true) {
                    ctx.options.rm_safe("shared");
                    ctx.options.rm_safe("fPIC");
                    effective = PackageType::HeaderLibrary;
                }
            }
        }
    }
    effective
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::OptionDecl;
    use crate::settings::Settings;
    use crate::{Options, RecipeMetadata};
    use async_trait::async_trait;
    use ferrite_types::Version;
    use std::path::PathBuf;

    struct SharedLib;

    #[async_trait]
    impl Recipe for SharedLib {
        fn metadata(&self) -> RecipeMetadata {
            RecipeMetadata::new(
                "demo",
                Version::parse("1.0").unwrap(),
                "MIT",
                "demo library",
            )
            .with_implements(&[Implements::AutoSharedFpic])
        }

        fn declare_options(&self, options: &mut Options) {
            options.declare("shared", OptionDecl::boolean(true));
            options.declare("fPIC", OptionDecl::boolean(true));
        }
    }

    fn context(base: PathBuf) -> RecipeContext {
        RecipeContext::new(
            ferrite_types::RecipeRef::new("demo", Version::parse("1.0").unwrap()),
            Settings::default(),
            Settings::default(),
            Options::new(),
            base,
        )
    }

    #[tokio::test]
    async fn auto_shared_fpic_erases_fpic() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = NullResolver;
        let mut driver = LifecycleDriver::new(&resolver);
        let captured = driver
            .run(&SharedLib, context(dir.path().to_path_buf()))
            .await
            .unwrap();
        // fPIC must not be part of the binary identity
        let mut options = Options::new();
        options.declare("shared", OptionDecl::boolean(true));
        let expected = PackageIdInfo::new(
            &captured.reference,
            &Settings::default(),
            &options,
        )
        .compute();
        assert_eq!(captured.package_id, expected);
    }

    #[tokio::test]
    async fn source_cache_makes_second_run_a_noop() {
        struct CountingSource(std::sync::atomic::AtomicUsize);

        #[async_trait]
        impl Recipe for CountingSource {
            fn metadata(&self) -> RecipeMetadata {
                RecipeMetadata::new(
                    "counting",
                    Version::parse("1.0").unwrap(),
                    "MIT",
                    "source-count probe",
                )
            }

            async fn source(&self, _ctx: &mut RecipeContext) -> Result<(), Error> {
                self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                Ok(())
            }
        }

        let recipe = CountingSource(std::sync::atomic::AtomicUsize::new(0));
        let dir = tempfile::tempdir().unwrap();
        let resolver = NullResolver;
        let mut driver = LifecycleDriver::new(&resolver);
        driver
            .run(&recipe, context(dir.path().to_path_buf()))
            .await
            .unwrap();
        driver
            .run(&recipe, context(dir.path().to_path_buf()))
            .await
            .unwrap();
        assert_eq!(recipe.0.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn packaging_failure_removes_package_folder() {
        struct FailingPackage;

        #[async_trait]
        impl Recipe for FailingPackage {
            fn metadata(&self) -> RecipeMetadata {
                RecipeMetadata::new(
                    "failing",
                    Version::parse("1.0").unwrap(),
                    "MIT",
                    "packaging-failure probe",
                )
            }

            async fn package(&self, ctx: &mut RecipeContext) -> Result<(), Error> {
                tokio::fs::write(ctx.package_folder().join("partial"), b"x").await?;
                Err(ferrite_errors::PackagingError::MissingArtifact {
                    path: "lib/libfailing.a".to_string(),
                }
                .into())
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path().to_path_buf());
        let package_folder = ctx.package_folder().to_path_buf();
        let resolver = NullResolver;
        let mut driver = LifecycleDriver::new(&resolver);
        let err = driver.run(&FailingPackage, ctx).await.unwrap_err();
        assert!(matches!(err, Error::Packaging(_)));
        assert!(!package_folder.exists());
    }
}
