//! CMake toolchain generator

use super::{report_written, Generator};
use crate::source::save;
use async_trait::async_trait;
use ferrite_errors::Error;
use ferrite_recipe::{checks, RecipeContext};
use ferrite_types::{CompilerKind, Libcxx, MsvcRuntime};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::PathBuf;

/// File name the CMake build driver passes as `-DCMAKE_TOOLCHAIN_FILE`
pub const CMAKE_TOOLCHAIN_FILE: &str = "ferrite_toolchain.cmake";

/// Renders the toolchain file CMake reads before the project
///
/// Presets derived from the resolved profile (build type, shared/fPIC,
/// language standard, runtime, cross target) land as cache variables;
/// recipes add their own through [`CMakeToolchain::cache_variables`].
pub struct CMakeToolchain {
    pub cache_variables: BTreeMap<String, String>,
    pub preprocessor_definitions: BTreeMap<String, String>,
    pub extra_cflags: Vec<String>,
    pub extra_cxxflags: Vec<String>,
    pub extra_sharedlinkflags: Vec<String>,
    pub extra_exelinkflags: Vec<String>,
    /// Policy defaults, e.g. `("CMP0077", "NEW")`
    pub policy_defaults: Vec<(String, String)>,
}

impl CMakeToolchain {
    /// Toolchain preset from the resolved profile
    #[must_use]
    pub fn new(ctx: &RecipeContext) -> Self {
        let mut cache_variables = BTreeMap::new();
        let mut preprocessor_definitions = BTreeMap::new();
        let mut extra_cxxflags = Vec::new();

        if let Ok(build_type) = ctx.settings.build_type() {
            cache_variables.insert("CMAKE_BUILD_TYPE".to_string(), build_type.to_string());
        }
        if let Some(shared) = ctx.options.get_bool("shared") {
            cache_variables.insert(
                "BUILD_SHARED_LIBS".to_string(),
                if shared { "ON" } else { "OFF" }.to_string(),
            );
        }
        if let Some(fpic) = ctx.options.get_bool("fPIC") {
            cache_variables.insert(
                "CMAKE_POSITION_INDEPENDENT_CODE".to_string(),
                if fpic { "ON" } else { "OFF" }.to_string(),
            );
        }
        if let Ok(compiler) = ctx.settings.compiler() {
            if let Some(cppstd) = compiler.cppstd {
                cache_variables.insert("CMAKE_CXX_STANDARD".to_string(), cppstd.to_string());
                cache_variables
                    .insert("CMAKE_CXX_STANDARD_REQUIRED".to_string(), "ON".to_string());
            }
            if let Some(runtime) = compiler.runtime {
                cache_variables.insert(
                    "CMAKE_MSVC_RUNTIME_LIBRARY".to_string(),
                    msvc_runtime_library(runtime).to_string(),
                );
            }
            match compiler.libcxx {
                Some(Libcxx::Libstdcxx) => {
                    preprocessor_definitions
                        .insert("_GLIBCXX_USE_CXX11_ABI".to_string(), "0".to_string());
                }
                Some(Libcxx::Libstdcxx11) => {
                    preprocessor_definitions
                        .insert("_GLIBCXX_USE_CXX11_ABI".to_string(), "1".to_string());
                }
                Some(Libcxx::Libcxx) => {
                    if compiler.kind == CompilerKind::Clang {
                        extra_cxxflags.push("-stdlib=libc++".to_string());
                    }
                }
                None => {}
            }
        }
        if checks::cross_building(ctx) {
            if let Ok(os) = ctx.settings.os() {
                cache_variables
                    .insert("CMAKE_SYSTEM_NAME".to_string(), os.cmake_system_name().to_string());
            }
            if let Ok(arch) = ctx.settings.arch() {
                cache_variables
                    .insert("CMAKE_SYSTEM_PROCESSOR".to_string(), arch.triplet_arch().to_string());
            }
        }

        Self {
            cache_variables,
            preprocessor_definitions,
            extra_cflags: Vec::new(),
            extra_cxxflags,
            extra_sharedlinkflags: Vec::new(),
            extra_exelinkflags: Vec::new(),
            policy_defaults: vec![("CMP0077".to_string(), "NEW".to_string())],
        }
    }

    fn render(&self, ctx: &RecipeContext) -> String {
        let mut out = String::new();
        out.push_str("# Rendered from the resolved profile; do not edit\n");
        for (policy, value) in &self.policy_defaults {
            let _ = writeln!(out, "set(CMAKE_POLICY_DEFAULT_{policy} {value})");
        }
        for (name, value) in &self.cache_variables {
            let _ = writeln!(out, "set({name} \"{value}\" CACHE STRING \"\" FORCE)");
        }
        for (name, value) in &self.preprocessor_definitions {
            let _ = writeln!(out, "add_compile_definitions({name}={value})");
        }
        if !self.extra_cflags.is_empty() {
            let _ = writeln!(
                out,
                "string(APPEND CMAKE_C_FLAGS_INIT \" {}\")",
                self.extra_cflags.join(" ")
            );
        }
        if !self.extra_cxxflags.is_empty() {
            let _ = writeln!(
                out,
                "string(APPEND CMAKE_CXX_FLAGS_INIT \" {}\")",
                self.extra_cxxflags.join(" ")
            );
        }
        if !self.extra_sharedlinkflags.is_empty() {
            let _ = writeln!(
                out,
                "string(APPEND CMAKE_SHARED_LINKER_FLAGS_INIT \" {}\")",
                self.extra_sharedlinkflags.join(" ")
            );
        }
        if !self.extra_exelinkflags.is_empty() {
            let _ = writeln!(
                out,
                "string(APPEND CMAKE_EXE_LINKER_FLAGS_INIT \" {}\")",
                self.extra_exelinkflags.join(" ")
            );
        }
        // Dependency config modules live next to this file
        let _ = writeln!(
            out,
            "list(PREPEND CMAKE_PREFIX_PATH \"{}\")",
            ctx.generators_folder().display()
        );
        out.push_str("set(CMAKE_FIND_PACKAGE_PREFER_CONFIG ON)\n");
        out
    }
}

#[async_trait]
impl Generator for CMakeToolchain {
    fn name(&self) -> &'static str {
        "CMakeToolchain"
    }

    async fn generate(&self, ctx: &RecipeContext) -> Result<Vec<PathBuf>, Error> {
        let path = ctx.generators_folder().join(CMAKE_TOOLCHAIN_FILE);
        save(&path, &self.render(ctx), false).await?;
        let files = vec![path];
        report_written(ctx, self.name(), &files);
        Ok(files)
    }
}

fn msvc_runtime_library(runtime: MsvcRuntime) -> &'static str {
    match runtime {
        MsvcRuntime::MT => "MultiThreaded",
        MsvcRuntime::MD => "MultiThreadedDLL",
        MsvcRuntime::MTd => "MultiThreadedDebug",
        MsvcRuntime::MDd => "MultiThreadedDebugDLL",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrite_recipe::{CompilerSettings, OptionDecl, Options, Settings};
    use ferrite_types::{Arch, BuildType, Os, RecipeRef, Version};

    fn context() -> RecipeContext {
        let mut options = Options::new();
        options.declare("shared", OptionDecl::boolean(false));
        options.declare("fPIC", OptionDecl::boolean(true));
        let settings = Settings {
            os: Some(Os::Linux),
            arch: Some(Arch::X86_64),
            compiler: Some(CompilerSettings {
                kind: CompilerKind::Gcc,
                version: Some("13".to_string()),
                libcxx: Some(Libcxx::Libstdcxx11),
                cppstd: Some(17),
                cstd: None,
                runtime: None,
            }),
            build_type: Some(BuildType::Release),
            cuda: None,
        };
        RecipeContext::new(
            RecipeRef::new("demo", Version::parse("1.0").unwrap()),
            settings.clone(),
            settings,
            options,
            std::path::PathBuf::from("/tmp/demo"),
        )
    }

    #[test]
    fn profile_presets_land_as_cache_variables() {
        let ctx = context();
        let toolchain = CMakeToolchain::new(&ctx);
        let rendered = toolchain.render(&ctx);
        assert!(rendered.contains("set(CMAKE_BUILD_TYPE \"Release\""));
        assert!(rendered.contains("set(BUILD_SHARED_LIBS \"OFF\""));
        assert!(rendered.contains("set(CMAKE_POSITION_INDEPENDENT_CODE \"ON\""));
        assert!(rendered.contains("set(CMAKE_CXX_STANDARD \"17\""));
        assert!(rendered.contains("add_compile_definitions(_GLIBCXX_USE_CXX11_ABI=1)"));
        // Same machine: no cross block
        assert!(!rendered.contains("CMAKE_SYSTEM_NAME"));
    }

    #[test]
    fn recipe_cache_variables_are_rendered() {
        let ctx = context();
        let mut toolchain = CMakeToolchain::new(&ctx);
        toolchain
            .cache_variables
            .insert("ENABLE_CJSON_UTILS".to_string(), "ON".to_string());
        assert!(toolchain
            .render(&ctx)
            .contains("set(ENABLE_CJSON_UTILS \"ON\""));
    }
}
