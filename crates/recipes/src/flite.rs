//! flite: small speech synthesis engine, Autotools-built

use async_trait::async_trait;
use ferrite_builder::normalize::{LicenseCapture, NormalizeOptions};
use ferrite_builder::{run_normalization, source, Autotools, AutotoolsToolchain, Generator};
use ferrite_errors::Error;
use ferrite_recipe::cpp_info::properties;
use ferrite_recipe::{
    is_msvc, Implements, Language, OptionDecl, Options, PackageMetadata, Recipe, RecipeContext,
    RecipeMetadata,
};
use ferrite_types::{Os, Version};

pub struct Flite;

#[async_trait]
impl Recipe for Flite {
    fn metadata(&self) -> RecipeMetadata {
        RecipeMetadata::new(
            "flite",
            Version::parse("2.2").expect("static version"),
            "flite",
            "A small fast portable speech synthesis system",
        )
        .with_homepage("http://cmuflite.org")
        .with_topics(&["speech", "synthesis", "tts"])
        .with_languages(&[Language::C])
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
        // The configure script only runs under a POSIX shell
        if is_msvc(&ctx.settings) {
            ctx.win_bash = true;
        }
        Ok(())
    }

    fn requirements(&self, ctx: &mut RecipeContext) -> Result<(), Error> {
        if ctx.settings.os().ok() == Some(Os::Linux) {
            ctx.requires("alsa/[>=1.2.10 <2]")?;
        }
        Ok(())
    }

    fn build_requirements(&self, ctx: &mut RecipeContext) -> Result<(), Error> {
        if is_msvc(&ctx.settings) {
            ctx.tool_requires("automake/[>=1.16]")?;
            ctx.tool_requires("msys2/[*]")?;
        }
        Ok(())
    }

    async fn source(&self, ctx: &mut RecipeContext) -> Result<(), Error> {
        let version = ctx.reference().version.to_string();
        let entry = ctx.manifest.source_for(&version)?.clone();
        let dest = ctx.source_folder().to_path_buf();
        source::get(ctx, &entry, &dest).await?;
        source::apply_manifest_patches(ctx).await
    }

    async fn generate(&self, ctx: &mut RecipeContext) -> Result<(), Error> {
        let mut toolchain = AutotoolsToolchain::new(ctx);
        toolchain.configure_args.push("--with-audio=none".to_string());
        toolchain.generate(ctx).await?;
        Ok(())
    }

    async fn build(&self, ctx: &mut RecipeContext) -> Result<(), Error> {
        let autotools = Autotools::new(ctx);
        autotools.configure(ctx, &[]).await?;
        autotools.make(ctx, None).await
    }

    async fn package(&self, ctx: &mut RecipeContext) -> Result<(), Error> {
        let autotools = Autotools::new(ctx);
        autotools.install(ctx, &[]).await?;
        run_normalization(
            ctx,
            &NormalizeOptions {
                license: Some(LicenseCapture::File {
                    path: "COPYING".to_string(),
                }),
                ..NormalizeOptions::default()
            },
        )
        .await
    }

    fn package_info(&self, ctx: &RecipeContext) -> Result<PackageMetadata, Error> {
        let mut metadata = PackageMetadata::default();
        let root = &mut metadata.cpp_info.root;
        root.libs.push("flite".to_string());
        root.set_property(properties::PKG_CONFIG_NAME, "flite");
        if ctx.settings.os().ok() == Some(Os::Linux) {
            root.system_libs.push("m".to_string());
            root.system_libs.push("pthread".to_string());
        }
        if ctx.settings.os().ok() == Some(Os::Windows) {
            root.system_libs.push("winmm".to_string());
        }
        Ok(metadata)
    }
}
