//! llguidance: Rust-implemented constrained-decoding library with a C API

use async_trait::async_trait;
use ferrite_builder::normalize::{LicenseCapture, NormalizeOptions};
use ferrite_builder::{fileops, run_normalization, source, CargoBuild};
use ferrite_errors::{Error, PackagingError};
use ferrite_recipe::cpp_info::properties;
use ferrite_recipe::{
    Implements, Language, OptionDecl, Options, PackageMetadata, Recipe, RecipeContext,
    RecipeMetadata,
};
use ferrite_types::{Os, Version};

pub struct Llguidance;

#[async_trait]
impl Recipe for Llguidance {
    fn metadata(&self) -> RecipeMetadata {
        RecipeMetadata::new(
            "llguidance",
            Version::parse("0.7.11").expect("static version"),
            "MIT",
            "Super-fast structured output for large language models",
        )
        .with_homepage("https://github.com/guidance-ai/llguidance")
        .with_topics(&["llm", "sampling", "grammar"])
        .with_languages(&[Language::C, Language::Rust])
        .with_implements(&[Implements::AutoSharedFpic])
    }

    fn declare_options(&self, options: &mut Options) {
        options.declare("shared", OptionDecl::boolean(false));
        options.declare("fPIC", OptionDecl::boolean(true));
    }

    fn configure(&self, ctx: &mut RecipeContext) -> Result<(), Error> {
        if ctx.settings.os().ok() == Some(Os::Windows) {
            ctx.options.rm_safe("fPIC");
        }
        Ok(())
    }

    fn build_requirements(&self, ctx: &mut RecipeContext) -> Result<(), Error> {
        ctx.tool_requires("rust/[>=1.77]")
    }

    async fn source(&self, ctx: &mut RecipeContext) -> Result<(), Error> {
        let version = ctx.reference().version.to_string();
        let entry = ctx.manifest.source_for(&version)?.clone();
        let dest = ctx.source_folder().to_path_buf();
        source::get(ctx, &entry, &dest).await
    }

    async fn build(&self, ctx: &mut RecipeContext) -> Result<(), Error> {
        let cargo = CargoBuild::new(ctx, "llguidance");
        cargo.build(ctx).await
    }

    async fn package(&self, ctx: &mut RecipeContext) -> Result<(), Error> {
        let os = ctx.settings.os()?;
        let shared = ctx.options.get_bool("shared") == Some(true);
        let cargo = CargoBuild::new(ctx, "llguidance");
        let artifact = cargo.artifact_name(os, shared);
        let profile_dir = CargoBuild::profile_dir(ctx.settings.build_type()?);

        let built = ctx.build_folder().join(profile_dir).join(&artifact);
        if !built.is_file() {
            return Err(PackagingError::MissingArtifact {
                path: built.display().to_string(),
            }
            .into());
        }
        fileops::copy_file(&built, &ctx.package_folder().join("lib")).await?;
        fileops::copy_glob(
            &ctx.source_folder().join("parser"),
            "llguidance.h",
            &ctx.package_folder().join("include"),
        )
        .await?;
        run_normalization(
            ctx,
            &NormalizeOptions {
                license: Some(LicenseCapture::File {
                    path: "LICENSE".to_string(),
                }),
                ..NormalizeOptions::default()
            },
        )
        .await
    }

    fn package_info(&self, ctx: &RecipeContext) -> Result<PackageMetadata, Error> {
        let mut metadata = PackageMetadata::default();
        let root = &mut metadata.cpp_info.root;
        root.libs.push("llguidance".to_string());
        root.set_property(properties::CMAKE_FILE_NAME, "llguidance");
        root.set_property(properties::CMAKE_TARGET_NAME, "llguidance::llguidance");
        root.set_property(properties::PKG_CONFIG_NAME, "llguidance");
        if ctx.settings.os().ok() == Some(Os::Linux) {
            root.system_libs.push("m".to_string());
            root.system_libs.push("pthread".to_string());
            root.system_libs.push("dl".to_string());
        }
        Ok(metadata)
    }
}
