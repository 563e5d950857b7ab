//! Meson machine-file generator

use super::{report_written, Generator};
use crate::source::{replace_in_file, save};
use async_trait::async_trait;
use ferrite_errors::Error;
use ferrite_recipe::{checks, RecipeContext};
use ferrite_types::{BuildType, CompilerKind};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Machine file for native builds
pub const MESON_NATIVE_FILE: &str = "ferrite_meson_native.ini";
/// Machine file for cross builds
pub const MESON_CROSS_FILE: &str = "ferrite_meson_cross.ini";

/// Meson toolchain generator
#[derive(Default)]
pub struct MesonToolchain {
    pub project_options: BTreeMap<String, String>,
}

impl MesonToolchain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// File the driver passes to `meson setup`
    #[must_use]
    pub fn machine_file(ctx: &RecipeContext) -> &'static str {
        if checks::cross_building(ctx) {
            MESON_CROSS_FILE
        } else {
            MESON_NATIVE_FILE
        }
    }

    fn render(&self, ctx: &RecipeContext) -> String {
        let mut out = String::new();

        out.push_str("[constants]\n");
        let _ = writeln!(out, "prefix = '{}'", ctx.package_folder().display());

        out.push_str("\n[binaries]\n");
        let (cc, cxx) = ctx.settings.compiler().map_or(("cc", "c++"), |compiler| {
            match compiler.kind {
                CompilerKind::Gcc => ("gcc", "g++"),
                CompilerKind::Clang | CompilerKind::AppleClang => ("clang", "clang++"),
                CompilerKind::Msvc => ("cl", "cl"),
            }
        });
        let _ = writeln!(out, "c = '{cc}'");
        let _ = writeln!(out, "cpp = '{cxx}'");
        out.push_str("pkg-config = 'pkg-config'\n");

        out.push_str("\n[built-in options]\n");
        if let Ok(build_type) = ctx.settings.build_type() {
            let _ = writeln!(out, "buildtype = '{}'", meson_buildtype(build_type));
        }
        if let Some(shared) = ctx.options.get_bool("shared") {
            let _ = writeln!(
                out,
                "default_library = '{}'",
                if shared { "shared" } else { "static" }
            );
        }
        out.push_str("prefix = prefix\n");

        out.push_str("\n[project options]\n");
        for (key, value) in &self.project_options {
            let _ = writeln!(out, "{key} = '{value}'");
        }
        out
    }
}

fn meson_buildtype(build_type: BuildType) -> &'static str {
    match build_type {
        BuildType::Debug => "debug",
        BuildType::Release => "release",
        BuildType::RelWithDebInfo => "debugoptimized",
        BuildType::MinSizeRel => "minsize",
    }
}

/// Add a Fortran compiler to an already generated machine file
///
/// # Errors
///
/// Returns `SourceError::NeedleNotFound` when the file carries no
/// `[binaries]` section.
pub async fn inject_fortran(machine_file: &Path, fc: &str) -> Result<(), Error> {
    replace_in_file(
        machine_file,
        "[binaries]",
        &format!("[binaries]\nfortran = '{fc}'"),
        true,
    )
    .await
}

#[async_trait]
impl Generator for MesonToolchain {
    fn name(&self) -> &'static str {
        "MesonToolchain"
    }

    async fn generate(&self, ctx: &RecipeContext) -> Result<Vec<PathBuf>, Error> {
        let path = ctx.generators_folder().join(Self::machine_file(ctx));
        save(&path, &self.render(ctx), false).await?;
        let files = vec![path];
        report_written(ctx, self.name(), &files);
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrite_recipe::{CompilerSettings, OptionDecl, Options, Settings};
    use ferrite_types::{Arch, Os, RecipeRef, Version};

    fn context() -> RecipeContext {
        let mut options = Options::new();
        options.declare("shared", OptionDecl::boolean(true));
        let settings = Settings {
            os: Some(Os::Linux),
            arch: Some(Arch::X86_64),
            compiler: Some(CompilerSettings::new(CompilerKind::Gcc)),
            build_type: Some(BuildType::RelWithDebInfo),
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
    fn sections_and_buildtype_mapping() {
        let ctx = context();
        let rendered = MesonToolchain::new().render(&ctx);
        assert!(rendered.contains("[binaries]"));
        assert!(rendered.contains("[built-in options]"));
        assert!(rendered.contains("buildtype = 'debugoptimized'"));
        assert!(rendered.contains("default_library = 'shared'"));
        assert_eq!(MesonToolchain::machine_file(&ctx), MESON_NATIVE_FILE);
    }

    #[tokio::test]
    async fn fortran_is_injected_into_binaries() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join(MESON_NATIVE_FILE);
        tokio::fs::write(&file, "[binaries]\nc = 'gcc'\n")
            .await
            .unwrap();
        inject_fortran(&file, "gfortran").await.unwrap();
        let contents = tokio::fs::read_to_string(&file).await.unwrap();
        assert!(contents.contains("fortran = 'gfortran'"));
    }
}
