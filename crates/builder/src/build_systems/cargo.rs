//! Cargo build driver for Rust-implemented native libraries
//!
//! Recipes drive `cargo rustc` directly so the produced artifact is a plain
//! C library. `CARGO_HOME` is pinned under the build folder to keep
//! registry state out of the user's home, and the non-standard build
//! configurations are mapped onto cargo profiles appended to the crate
//! manifest.

use crate::fileops::unix_path;
use crate::jobs;
use crate::source::save;
use ferrite_errors::{BuildError, Error};
use ferrite_recipe::{checks, RecipeContext};
use ferrite_types::{Arch, BuildType, CompilerKind, Os};
use std::collections::HashMap;

/// Profile section for `RelWithDebInfo`, appended to `Cargo.toml`
const RELEASE_WITH_DEBUG: &str = "\n[profile.release-with-debug]\ninherits = \"release\"\ndebug = true\n";
/// Profile section for `MinSizeRel`, appended to `Cargo.toml`
const RELEASE_OPT_SIZE: &str = "\n[profile.release-opt-size]\ninherits = \"release\"\nopt-level = \"z\"\n";

/// Driver building one crate of a Cargo workspace
pub struct CargoBuild {
    crate_name: String,
    pub features: Vec<String>,
    jobs: usize,
}

impl CargoBuild {
    /// Driver for one crate with the governed job count
    #[must_use]
    pub fn new(ctx: &RecipeContext, crate_name: impl Into<String>) -> Self {
        Self {
            crate_name: crate_name.into(),
            features: Vec::new(),
            jobs: jobs::governed_build_jobs(ctx),
        }
    }

    /// Cargo flag for a build configuration; `Debug` is cargo's default
    #[must_use]
    pub fn profile_flag(build_type: BuildType) -> Option<&'static str> {
        match build_type {
            BuildType::Debug => None,
            BuildType::Release => Some("--release"),
            BuildType::RelWithDebInfo => Some("--profile=release-with-debug"),
            BuildType::MinSizeRel => Some("--profile=release-opt-size"),
        }
    }

    /// Append the custom profile the active configuration needs
    ///
    /// A no-op for `Debug`/`Release` and when the profile is already
    /// declared in the crate manifest.
    ///
    /// # Errors
    ///
    /// Returns I/O errors from editing `Cargo.toml`.
    pub async fn ensure_profiles(&self, ctx: &RecipeContext) -> Result<(), Error> {
        let (section, marker) = match ctx.settings.build_type()? {
            BuildType::RelWithDebInfo => (RELEASE_WITH_DEBUG, "[profile.release-with-debug]"),
            BuildType::MinSizeRel => (RELEASE_OPT_SIZE, "[profile.release-opt-size]"),
            BuildType::Debug | BuildType::Release => return Ok(()),
        };
        let manifest = ctx.source_folder().join("Cargo.toml");
        let contents = tokio::fs::read_to_string(&manifest)
            .await
            .map_err(|e| Error::io_with_path(&e, &manifest))?;
        if contents.contains(marker) {
            return Ok(());
        }
        save(&manifest, section, true).await
    }

    /// Crate type produced for the current `shared` option
    #[must_use]
    pub fn crate_type(ctx: &RecipeContext) -> &'static str {
        if ctx.options.get_bool("shared") == Some(true) {
            "cdylib"
        } else {
            "staticlib"
        }
    }

    /// Run `cargo rustc` for the crate
    ///
    /// # Errors
    ///
    /// Returns `BuildError::CompileFailed` on a non-zero exit.
    pub async fn build(&self, ctx: &RecipeContext) -> Result<(), Error> {
        super::require_tool("cargo")?;
        self.ensure_profiles(ctx).await?;

        let target_dir = ctx.build_folder().display().to_string();
        let crate_type_arg = format!("--crate-type={}", Self::crate_type(ctx));
        let jobs_arg = self.jobs.to_string();
        let mut args = vec![
            "rustc".to_string(),
            "-p".to_string(),
            self.crate_name.clone(),
            "--jobs".to_string(),
            jobs_arg,
            crate_type_arg,
        ];
        if let Some(flag) = Self::profile_flag(ctx.settings.build_type()?) {
            args.push(flag.to_string());
        }
        if !self.features.is_empty() {
            args.push("--features".to_string());
            args.push(self.features.join(","));
        }

        let mut env = HashMap::new();
        let cargo_home = ctx.build_folder().join(".cargo");
        env.insert(
            "CARGO_HOME".to_string(),
            if checks::is_msvc(&ctx.settings) {
                unix_path(&cargo_home.display().to_string())
            } else {
                cargo_home.display().to_string()
            },
        );

        if checks::cross_building(ctx) {
            let triple = rust_triple(ctx)?;
            args.push(format!("--target={triple}"));
            // The target linker is the resolved C compiler
            let linker = match ctx.settings.compiler()?.kind {
                CompilerKind::Gcc => "gcc",
                CompilerKind::Clang | CompilerKind::AppleClang => "clang",
                CompilerKind::Msvc => "link.exe",
            };
            let linker_key = format!(
                "CARGO_TARGET_{}_LINKER",
                triple.to_uppercase().replace('-', "_")
            );
            env.insert(linker_key, linker.to_string());
        }

        args.push("--target-dir".to_string());
        args.push(target_dir);

        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        ctx.run_with_env("cargo", &arg_refs, Some(ctx.source_folder()), &env)
            .await
            .map_err(|e| {
                Error::from(BuildError::CompileFailed {
                    message: e.to_string(),
                })
            })?;
        Ok(())
    }

    /// Directory inside the target dir the artifact lands in
    #[must_use]
    pub fn profile_dir(build_type: BuildType) -> &'static str {
        match build_type {
            BuildType::Debug => "debug",
            BuildType::Release => "release",
            BuildType::RelWithDebInfo => "release-with-debug",
            BuildType::MinSizeRel => "release-opt-size",
        }
    }

    /// File name of the produced library
    #[must_use]
    pub fn artifact_name(&self, os: Os, shared: bool) -> String {
        let base = self.crate_name.replace('-', "_");
        match (os, shared) {
            (Os::Windows, true) => format!("{base}.dll"),
            (Os::Windows, false) => format!("{base}.lib"),
            (Os::Macos | Os::Ios, true) => format!("lib{base}.dylib"),
            (_, true) => format!("lib{base}.so"),
            (_, false) => format!("lib{base}.a"),
        }
    }
}

fn rust_triple(ctx: &RecipeContext) -> Result<String, Error> {
    let os = ctx.settings.os()?;
    let arch = ctx.settings.arch()?;
    let arch_part = match arch {
        Arch::X86 => "i686",
        Arch::X86_64 => "x86_64",
        Arch::Armv7 => "armv7",
        Arch::Armv8 => "aarch64",
        Arch::Riscv64 => "riscv64gc",
    };
    let os_part = match os {
        Os::Linux => "unknown-linux-gnu",
        Os::Macos => "apple-darwin",
        Os::Ios => "apple-ios",
        Os::Windows => {
            if checks::is_msvc(&ctx.settings) {
                "pc-windows-msvc"
            } else {
                "pc-windows-gnu"
            }
        }
        Os::FreeBsd => "unknown-freebsd",
        Os::Android => "linux-android",
    };
    Ok(format!("{arch_part}-{os_part}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrite_recipe::{CompilerSettings, OptionDecl, Options, Settings};
    use ferrite_types::{RecipeRef, Version};

    fn context(build_type: BuildType, shared: bool) -> RecipeContext {
        let mut options = Options::new();
        options.declare("shared", OptionDecl::boolean(shared));
        let settings = Settings {
            os: Some(Os::Linux),
            arch: Some(Arch::X86_64),
            compiler: Some(CompilerSettings::new(CompilerKind::Gcc)),
            build_type: Some(build_type),
            cuda: None,
        };
        RecipeContext::new(
            RecipeRef::new("llguidance", Version::parse("0.7.11").unwrap()),
            settings.clone(),
            settings,
            options,
            std::path::PathBuf::from("/tmp/llguidance"),
        )
    }

    #[test]
    fn profile_mapping() {
        assert_eq!(CargoBuild::profile_flag(BuildType::Debug), None);
        assert_eq!(
            CargoBuild::profile_flag(BuildType::Release),
            Some("--release")
        );
        assert_eq!(
            CargoBuild::profile_flag(BuildType::RelWithDebInfo),
            Some("--profile=release-with-debug")
        );
        assert_eq!(
            CargoBuild::profile_flag(BuildType::MinSizeRel),
            Some("--profile=release-opt-size")
        );
    }

    #[test]
    fn crate_type_follows_shared() {
        assert_eq!(
            CargoBuild::crate_type(&context(BuildType::Release, false)),
            "staticlib"
        );
        assert_eq!(
            CargoBuild::crate_type(&context(BuildType::Release, true)),
            "cdylib"
        );
    }

    #[test]
    fn artifact_names() {
        let ctx = context(BuildType::Release, false);
        let cargo = CargoBuild::new(&ctx, "llguidance");
        assert_eq!(cargo.artifact_name(Os::Linux, false), "libllguidance.a");
        assert_eq!(cargo.artifact_name(Os::Windows, false), "llguidance.lib");
        assert_eq!(cargo.artifact_name(Os::Macos, true), "libllguidance.dylib");
    }

    #[tokio::test]
    async fn rel_with_deb_info_appends_profile() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(BuildType::RelWithDebInfo, false);
        ctx.set_layout(ferrite_recipe::Layout::basic(dir.path()));
        tokio::fs::create_dir_all(ctx.source_folder()).await.unwrap();
        let manifest = ctx.source_folder().join("Cargo.toml");
        tokio::fs::write(&manifest, "[package]\nname = \"llguidance\"\n")
            .await
            .unwrap();

        let cargo = CargoBuild::new(&ctx, "llguidance");
        cargo.ensure_profiles(&ctx).await.unwrap();
        let contents = tokio::fs::read_to_string(&manifest).await.unwrap();
        assert!(contents.contains("[profile.release-with-debug]"));

        // Idempotent on a second run
        cargo.ensure_profiles(&ctx).await.unwrap();
        let again = tokio::fs::read_to_string(&manifest).await.unwrap();
        assert_eq!(contents, again);
    }
}
