//! cJSON: ultralightweight JSON parser with a split utils library

use async_trait::async_trait;
use ferrite_builder::normalize::{LicenseCapture, NormalizeOptions, Prune};
use ferrite_builder::{run_normalization, source, CMake, CMakeToolchain, Generator};
use ferrite_errors::Error;
use ferrite_recipe::cpp_info::properties;
use ferrite_recipe::{
    Implements, Language, Layout, OptionDecl, Options, PackageMetadata, Recipe, RecipeContext,
    RecipeMetadata,
};
use ferrite_types::{Os, Version};

pub struct Cjson;

#[async_trait]
impl Recipe for Cjson {
    fn metadata(&self) -> RecipeMetadata {
        RecipeMetadata::new(
            "cjson",
            Version::parse("1.7.18").expect("static version"),
            "MIT",
            "Ultralightweight JSON parser in ANSI C",
        )
        .with_homepage("https://github.com/DaveGamble/cJSON")
        .with_topics(&["json", "parser"])
        .with_languages(&[Language::C])
        .with_implements(&[Implements::AutoSharedFpic])
    }

    fn declare_options(&self, options: &mut Options) {
        options.declare("shared", OptionDecl::boolean(false));
        options.declare("fPIC", OptionDecl::boolean(true));
        options.declare(
            "utils",
            OptionDecl::boolean(false).described("Build the cJSON_Utils library"),
        );
        options.declare(
            "use_locales",
            OptionDecl::boolean(true).described("Honor the locale for number formatting"),
        );
    }

    fn configure(&self, ctx: &mut RecipeContext) -> Result<(), Error> {
        if ctx.settings.os().ok() == Some(Os::Windows) {
            ctx.options.rm_safe("fPIC");
        }
        Ok(())
    }

    fn layout(&self, ctx: &RecipeContext) -> Layout {
        ctx.settings.build_type().map_or_else(
            |_| Layout::basic(ctx.base_folder()),
            |build_type| Layout::cmake(ctx.base_folder(), build_type),
        )
    }

    async fn source(&self, ctx: &mut RecipeContext) -> Result<(), Error> {
        let version = ctx.reference().version.to_string();
        let entry = ctx.manifest.source_for(&version)?.clone();
        let dest = ctx.source_folder().to_path_buf();
        source::get(ctx, &entry, &dest).await?;
        source::apply_manifest_patches(ctx).await
    }

    async fn generate(&self, ctx: &mut RecipeContext) -> Result<(), Error> {
        let mut toolchain = CMakeToolchain::new(ctx);
        let on_off = |v: bool| (if v { "ON" } else { "OFF" }).to_string();
        toolchain.cache_variables.insert(
            "ENABLE_CJSON_UTILS".to_string(),
            on_off(ctx.options.get_bool("utils") == Some(true)),
        );
        toolchain.cache_variables.insert(
            "ENABLE_LOCALES".to_string(),
            on_off(ctx.options.get_bool("use_locales") == Some(true)),
        );
        toolchain
            .cache_variables
            .insert("ENABLE_CJSON_TEST".to_string(), "OFF".to_string());
        toolchain
            .cache_variables
            .insert("BUILD_SHARED_AND_STATIC_LIBS".to_string(), "OFF".to_string());
        toolchain.generate(ctx).await?;
        Ok(())
    }

    async fn build(&self, ctx: &mut RecipeContext) -> Result<(), Error> {
        let cmake = CMake::new(ctx);
        cmake.configure(ctx, None).await?;
        cmake.build(ctx, None).await
    }

    async fn package(&self, ctx: &mut RecipeContext) -> Result<(), Error> {
        let cmake = CMake::new(ctx);
        cmake.install(ctx).await?;
        let prune = if ctx.options.get_bool("shared") == Some(true) {
            Prune::StaticArtifacts
        } else {
            Prune::SharedArtifacts
        };
        run_normalization(
            ctx,
            &NormalizeOptions {
                prune: Some(prune),
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
        metadata
            .cpp_info
            .root
            .set_property(properties::CMAKE_FILE_NAME, "cJSON");

        let core = metadata.cpp_info.component_mut("_cjson");
        core.libs.push("cjson".to_string());
        core.set_property(properties::CMAKE_TARGET_NAME, "cjson::cjson");
        core.set_property(properties::PKG_CONFIG_NAME, "libcjson");
        if ctx.settings.os().ok() == Some(Os::Linux) {
            core.system_libs.push("m".to_string());
        }

        if ctx.options.get_bool("utils") == Some(true) {
            let utils = metadata.cpp_info.component_mut("cjson_utils");
            utils.libs.push("cjson_utils".to_string());
            utils.requires.push("_cjson".to_string());
            utils.set_property(properties::CMAKE_TARGET_NAME, "cjson::cjson_utils");
            utils.set_property(properties::PKG_CONFIG_NAME, "libcjson_utils");
        }
        Ok(metadata)
    }
}
