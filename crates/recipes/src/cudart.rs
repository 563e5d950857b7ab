//! cudart: binary repackage of the CUDA runtime redistributable
//!
//! Nothing is compiled; the vendor archive for the profile's CUDA version
//! is downloaded and its files rearranged into the package layout,
//! including the driver stubs consumers link against at build time.

use async_trait::async_trait;
use ferrite_builder::{fileops, BinaryRepackage};
use ferrite_errors::{Error, RecipeError};
use ferrite_recipe::cpp_info::properties;
use ferrite_recipe::{
    OptionDecl, Options, PackageIdInfo, PackageMetadata, Recipe, RecipeContext, RecipeMetadata,
};
use ferrite_types::{Arch, Os, PackageType, Version};

pub struct Cudart;

impl Cudart {
    /// Manifest key of the redistributable archive for one profile
    fn source_key(ctx: &RecipeContext) -> Result<String, Error> {
        let cuda = ctx.settings.cuda.as_ref().ok_or_else(|| {
            Error::from(RecipeError::SettingMissing {
                setting: "cuda.version".to_string(),
            })
        })?;
        let os = ctx.settings.os()?;
        let arch = ctx.settings.arch()?;
        Ok(format!("{}-{}-{}", cuda.version, os, arch).to_lowercase())
    }
}

#[async_trait]
impl Recipe for Cudart {
    fn metadata(&self) -> RecipeMetadata {
        RecipeMetadata::new(
            "cudart",
            Version::parse("12.4.127").expect("static version"),
            "NVIDIA CUDA Toolkit EULA",
            "CUDA Runtime library",
        )
        .with_homepage("https://developer.nvidia.com/cuda-toolkit")
        .with_topics(&["cuda", "nvidia", "runtime"])
        .with_package_type(PackageType::SharedLibrary)
    }

    fn declare_options(&self, options: &mut Options) {
        options.declare("shared", OptionDecl::boolean(true));
    }

    fn validate(&self, ctx: &RecipeContext) -> Result<(), Error> {
        let os = ctx.settings.os()?;
        if !matches!(os, Os::Linux | Os::Windows) {
            return Err(RecipeError::ConfigurationInvalid {
                reference: ctx.reference().to_string(),
                message: format!("no redistributable archive for {os}"),
            }
            .into());
        }
        if ctx.settings.arch()? != Arch::X86_64 && ctx.settings.arch()? != Arch::Armv8 {
            return Err(RecipeError::ConfigurationInvalid {
                reference: ctx.reference().to_string(),
                message: "only x86_64 and armv8 archives are published".to_string(),
            }
            .into());
        }
        if ctx.settings.cuda.is_none() {
            return Err(RecipeError::ConfigurationInvalid {
                reference: ctx.reference().to_string(),
                message: "profile declares no cuda.version".to_string(),
            }
            .into());
        }
        Ok(())
    }

    // The archive choice depends on os/arch, so the download happens in
    // build rather than in the settings-independent source state
    async fn build(&self, ctx: &mut RecipeContext) -> Result<(), Error> {
        let key = Self::source_key(ctx)?;
        let entry = ctx.manifest.source_for(&key)?.clone();
        BinaryRepackage::stage(ctx, &entry).await?;
        Ok(())
    }

    async fn package(&self, ctx: &mut RecipeContext) -> Result<(), Error> {
        let staging = ctx.build_folder().join("prebuilt");
        BinaryRepackage::deploy(ctx, &staging, "include", "**", "include").await?;
        match ctx.settings.os()? {
            Os::Windows => {
                BinaryRepackage::deploy(ctx, &staging, "bin", "cudart*.dll", "bin").await?;
                BinaryRepackage::deploy(ctx, &staging, "lib/x64", "*.lib", "lib").await?;
            }
            _ => {
                BinaryRepackage::deploy(ctx, &staging, "lib", "libcudart.so*", "lib").await?;
                BinaryRepackage::deploy(ctx, &staging, "lib", "libcudadevrt.a", "lib").await?;
                BinaryRepackage::deploy(ctx, &staging, "lib/stubs", "*", "lib/stubs").await?;
            }
        }
        let eula = staging.join("LICENSE");
        fileops::copy_file(&eula, &ctx.package_folder().join("licenses")).await?;
        Ok(())
    }

    fn package_info(&self, ctx: &RecipeContext) -> Result<PackageMetadata, Error> {
        let mut metadata = PackageMetadata::default();
        metadata
            .cpp_info
            .root
            .set_property(properties::CMAKE_FILE_NAME, "CUDAToolkit");

        let cudart = metadata.cpp_info.component_mut("cudart");
        cudart.libs.push("cudart".to_string());
        cudart.set_property(properties::CMAKE_TARGET_NAME, "CUDA::cudart");
        cudart.set_property(properties::PKG_CONFIG_NAME, "cudart");

        let devrt = metadata.cpp_info.component_mut("cudadevrt");
        devrt.libs.push("cudadevrt".to_string());
        devrt.set_property(properties::CMAKE_TARGET_NAME, "CUDA::cudadevrt");
        devrt.requires.push("cudart".to_string());

        metadata
            .buildenv_info
            .define_path("CUDA_PATH", ctx.package_folder().display().to_string());
        metadata.runenv_info.prepend_path(
            "LD_LIBRARY_PATH",
            ctx.package_folder().join("lib").display().to_string(),
        );
        Ok(metadata)
    }

    fn package_id(&self, info: &mut PackageIdInfo) -> Result<(), Error> {
        // Prebuilt vendor binaries: neither the compiler nor the build
        // configuration of the consumer changes what is packaged
        info.rm_setting("compiler");
        info.rm_setting("build_type");
        Ok(())
    }
}
