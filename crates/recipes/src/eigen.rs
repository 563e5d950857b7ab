//! Eigen: header-only linear algebra

use async_trait::async_trait;
use ferrite_builder::normalize::{LicenseCapture, NormalizeOptions};
use ferrite_builder::{fileops, run_normalization, source};
use ferrite_errors::Error;
use ferrite_recipe::cpp_info::properties;
use ferrite_recipe::{
    check_min_cppstd, Language, PackageIdInfo, PackageMetadata, Recipe, RecipeContext,
    RecipeMetadata,
};
use ferrite_types::{PackageType, Version};

pub struct Eigen;

#[async_trait]
impl Recipe for Eigen {
    fn metadata(&self) -> RecipeMetadata {
        RecipeMetadata::new(
            "eigen",
            Version::parse("3.4.0").expect("static version"),
            "MPL-2.0",
            "C++ template library for linear algebra",
        )
        .with_homepage("http://eigen.tuxfamily.org")
        .with_topics(&["algebra", "linear-algebra", "matrix", "header-only"])
        .with_package_type(PackageType::HeaderLibrary)
        .with_languages(&[Language::Cpp])
    }

    fn validate(&self, ctx: &RecipeContext) -> Result<(), Error> {
        check_min_cppstd(ctx, 14)
    }

    async fn source(&self, ctx: &mut RecipeContext) -> Result<(), Error> {
        let version = ctx.reference().version.to_string();
        let entry = ctx.manifest.source_for(&version)?.clone();
        let dest = ctx.source_folder().to_path_buf();
        source::get(ctx, &entry, &dest).await
    }

    async fn package(&self, ctx: &mut RecipeContext) -> Result<(), Error> {
        let include = ctx.package_folder().join("include/eigen3");
        fileops::copy_glob(ctx.source_folder(), "Eigen/**", &include).await?;
        fileops::copy_glob(ctx.source_folder(), "unsupported/Eigen/**", &include).await?;
        run_normalization(
            ctx,
            &NormalizeOptions {
                license: Some(LicenseCapture::File {
                    path: "COPYING.MPL2".to_string(),
                }),
                ..NormalizeOptions::default()
            },
        )
        .await
    }

    fn package_info(&self, _ctx: &RecipeContext) -> Result<PackageMetadata, Error> {
        let mut metadata = PackageMetadata::default();
        let root = &mut metadata.cpp_info.root;
        root.includedirs = vec!["include/eigen3".to_string()];
        root.libdirs.clear();
        root.bindirs.clear();
        root.set_property(properties::CMAKE_FILE_NAME, "Eigen3");
        root.set_property(properties::CMAKE_TARGET_NAME, "Eigen3::Eigen");
        root.set_property(properties::PKG_CONFIG_NAME, "eigen3");
        Ok(metadata)
    }

    fn package_id(&self, info: &mut PackageIdInfo) -> Result<(), Error> {
        // Headers are identical across profiles
        info.clear();
        Ok(())
    }
}
