//! Autotools environment-script generator
//!
//! Emits the tool and flag environment a `configure` script reads, plus the
//! prepared `configure` argument vector. Under MSVC the compiler and
//! archiver are wrapped through automake's `compile`/`ar-lib` shims and the
//! recipe is expected to run with `win_bash` active.

use super::{report_written, Generator};
use crate::source::save;
use async_trait::async_trait;
use ferrite_errors::Error;
use ferrite_recipe::{checks, RecipeContext};
use ferrite_types::{Arch, BuildType, CompilerKind, Libcxx, Os};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::PathBuf;

/// Shell script exporting the build environment
pub const AUTOTOOLS_ENV_SCRIPT: &str = "ferrite_autotools.sh";
/// Plain `KEY=VALUE` rendition of the same environment, driver-readable
pub const AUTOTOOLS_ENV_FILE: &str = "ferrite_autotools.env";
/// One configure argument per line
pub const AUTOTOOLS_ARGS_FILE: &str = "ferrite_configure_args";

/// GNU triplet for a target platform
#[must_use]
pub fn gnu_triplet(os: Os, arch: Arch) -> String {
    let arch_part = arch.triplet_arch();
    let os_part = match os {
        Os::Linux => "linux-gnu",
        Os::Macos | Os::Ios => "apple-darwin",
        Os::Windows => "w64-mingw32",
        Os::FreeBsd => "unknown-freebsd",
        Os::Android => "linux-android",
    };
    format!("{arch_part}-{os_part}")
}

/// Autotools toolchain generator
pub struct AutotoolsToolchain {
    pub configure_args: Vec<String>,
    pub make_args: Vec<String>,
    pub env: BTreeMap<String, String>,
}

impl AutotoolsToolchain {
    /// Derive environment and configure arguments from the resolved profile
    #[must_use]
    pub fn new(ctx: &RecipeContext) -> Self {
        let mut env = BTreeMap::new();
        let mut configure_args = vec![
            format!("--prefix={}", ctx.package_folder().display()),
            "--bindir=${prefix}/bin".to_string(),
            "--sbindir=${prefix}/bin".to_string(),
            "--libdir=${prefix}/lib".to_string(),
            "--includedir=${prefix}/include".to_string(),
            "--oldincludedir=${prefix}/include".to_string(),
        ];

        if let Some(shared) = ctx.options.get_bool("shared") {
            if shared {
                configure_args.push("--enable-shared".to_string());
                configure_args.push("--disable-static".to_string());
            } else {
                configure_args.push("--disable-shared".to_string());
                configure_args.push("--enable-static".to_string());
            }
        }
        if checks::cross_building(ctx) {
            if let (Ok(os), Ok(arch)) = (ctx.settings.os(), ctx.settings.arch()) {
                configure_args.push(format!("--host={}", gnu_triplet(os, arch)));
            }
            if let (Ok(os), Ok(arch)) = (ctx.settings_build.os(), ctx.settings_build.arch()) {
                configure_args.push(format!("--build={}", gnu_triplet(os, arch)));
            }
        }

        if checks::is_msvc(&ctx.settings) {
            let (compile_wrapper, ar_wrapper) = msvc_wrappers(ctx);
            env.insert("CC".to_string(), format!("{compile_wrapper} cl -nologo"));
            env.insert("CXX".to_string(), format!("{compile_wrapper} cl -nologo"));
            env.insert("LD".to_string(), "link -nologo".to_string());
            env.insert("AR".to_string(), format!("{ar_wrapper} lib"));
            env.insert("NM".to_string(), "dumpbin -symbols".to_string());
            env.insert("RANLIB".to_string(), ":".to_string());
            env.insert("STRIP".to_string(), ":".to_string());
        } else if let Ok(compiler) = ctx.settings.compiler() {
            let (cc, cxx) = match compiler.kind {
                CompilerKind::Gcc => ("gcc", "g++"),
                CompilerKind::Clang | CompilerKind::AppleClang => ("clang", "clang++"),
                CompilerKind::Msvc => unreachable!("handled above"),
            };
            env.insert("CC".to_string(), cc.to_string());
            env.insert("CXX".to_string(), cxx.to_string());
            env.insert("LD".to_string(), cc.to_string());
            env.insert("AR".to_string(), "ar".to_string());
            env.insert("NM".to_string(), "nm".to_string());
            env.insert("RANLIB".to_string(), "ranlib".to_string());
            env.insert("STRIP".to_string(), "strip".to_string());
        }

        let mut cflags = build_type_flags(ctx.settings.build_type().ok());
        if ctx.options.get_bool("fPIC") == Some(true) {
            cflags.push("-fPIC".to_string());
        }
        let mut cxxflags = cflags.clone();
        if let Ok(compiler) = ctx.settings.compiler() {
            if compiler.libcxx == Some(Libcxx::Libcxx) {
                cxxflags.push("-stdlib=libc++".to_string());
            }
        }

        let mut cppflags = Vec::new();
        let mut ldflags = Vec::new();
        for dep in ctx.dependencies.iter_host() {
            for dir in &dep.cpp_info.root.includedirs {
                cppflags.push(format!("-I{}/{dir}", dep.package_folder.display()));
            }
            for define in &dep.cpp_info.root.defines {
                cppflags.push(format!("-D{define}"));
            }
            for dir in &dep.cpp_info.root.libdirs {
                ldflags.push(format!("-L{}/{dir}", dep.package_folder.display()));
            }
        }

        if !cflags.is_empty() {
            env.insert("CFLAGS".to_string(), cflags.join(" "));
        }
        if !cxxflags.is_empty() {
            env.insert("CXXFLAGS".to_string(), cxxflags.join(" "));
        }
        if !cppflags.is_empty() {
            env.insert("CPPFLAGS".to_string(), cppflags.join(" "));
        }
        if !ldflags.is_empty() {
            env.insert("LDFLAGS".to_string(), ldflags.join(" "));
        }
        env.insert(
            "PKG_CONFIG_PATH".to_string(),
            ctx.generators_folder().display().to_string(),
        );

        Self {
            configure_args,
            make_args: Vec::new(),
            env,
        }
    }
}

fn msvc_wrappers(ctx: &RecipeContext) -> (String, String) {
    // The wrappers ship with automake; use the tool package when resolved,
    // fall back to the scripts being on PATH
    ctx.dependencies.get_build("automake").map_or_else(
        |_| ("compile".to_string(), "ar-lib".to_string()),
        |automake| {
            let base = automake.package_folder.join("bin");
            (
                base.join("compile").display().to_string(),
                base.join("ar-lib").display().to_string(),
            )
        },
    )
}

fn build_type_flags(build_type: Option<BuildType>) -> Vec<String> {
    match build_type {
        Some(BuildType::Debug) => vec!["-g".to_string()],
        Some(BuildType::Release) => vec!["-O2".to_string()],
        Some(BuildType::RelWithDebInfo) => vec!["-O2".to_string(), "-g".to_string()],
        Some(BuildType::MinSizeRel) => vec!["-Os".to_string()],
        None => Vec::new(),
    }
}

#[async_trait]
impl Generator for AutotoolsToolchain {
    fn name(&self) -> &'static str {
        "AutotoolsToolchain"
    }

    async fn generate(&self, ctx: &RecipeContext) -> Result<Vec<PathBuf>, Error> {
        let mut script = String::from("#!/bin/sh\n");
        let mut plain = String::new();
        for (key, value) in &self.env {
            let _ = writeln!(script, "export {key}=\"{value}\"");
            let _ = writeln!(plain, "{key}={value}");
        }
        let script_path = ctx.generators_folder().join(AUTOTOOLS_ENV_SCRIPT);
        let env_path = ctx.generators_folder().join(AUTOTOOLS_ENV_FILE);
        let args_path = ctx.generators_folder().join(AUTOTOOLS_ARGS_FILE);
        save(&script_path, &script, false).await?;
        save(&env_path, &plain, false).await?;
        save(&args_path, &(self.configure_args.join("\n") + "\n"), false).await?;
        let files = vec![script_path, env_path, args_path];
        report_written(ctx, self.name(), &files);
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrite_recipe::{CompilerSettings, OptionDecl, Options, Settings};
    use ferrite_types::{MsvcRuntime, RecipeRef, Version};

    fn windows_msvc() -> Settings {
        Settings {
            os: Some(Os::Windows),
            arch: Some(Arch::X86_64),
            compiler: Some(CompilerSettings {
                kind: CompilerKind::Msvc,
                version: Some("194".to_string()),
                libcxx: None,
                cppstd: None,
                cstd: None,
                runtime: Some(MsvcRuntime::MD),
            }),
            build_type: Some(BuildType::Release),
            cuda: None,
        }
    }

    fn context(settings: Settings) -> RecipeContext {
        let mut options = Options::new();
        options.declare("shared", OptionDecl::boolean(false));
        RecipeContext::new(
            RecipeRef::new("flite", Version::parse("2.2").unwrap()),
            settings.clone(),
            settings,
            options,
            std::path::PathBuf::from("/tmp/flite"),
        )
    }

    #[test]
    fn msvc_tools_are_wrapped() {
        let toolchain = AutotoolsToolchain::new(&context(windows_msvc()));
        assert_eq!(
            toolchain.env.get("CC").map(String::as_str),
            Some("compile cl -nologo")
        );
        assert_eq!(
            toolchain.env.get("AR").map(String::as_str),
            Some("ar-lib lib")
        );
        assert_eq!(toolchain.env.get("RANLIB").map(String::as_str), Some(":"));
    }

    #[test]
    fn static_build_disables_shared() {
        let toolchain = AutotoolsToolchain::new(&context(windows_msvc()));
        assert!(toolchain
            .configure_args
            .contains(&"--disable-shared".to_string()));
        assert!(toolchain
            .configure_args
            .contains(&"--enable-static".to_string()));
        assert!(toolchain.configure_args[0].starts_with("--prefix="));
    }

    #[test]
    fn triplets() {
        assert_eq!(gnu_triplet(Os::Linux, Arch::Armv8), "aarch64-linux-gnu");
        assert_eq!(gnu_triplet(Os::Macos, Arch::X86_64), "x86_64-apple-darwin");
    }
}
