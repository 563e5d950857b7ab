//! pkg-config file generator for resolved dependencies

use super::{report_written, Generator};
use crate::source::save;
use async_trait::async_trait;
use ferrite_errors::Error;
use ferrite_recipe::cpp_info::{properties, PropertyValue};
use ferrite_recipe::{Component, CppInfo, RecipeContext, ResolvedDependency};
use std::fmt::Write as _;
use std::path::PathBuf;

/// Emits one `.pc` per resolved dependency component, plus alias files
#[derive(Default)]
pub struct PkgConfigDeps;

impl PkgConfigDeps {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn render_pc(dep: &ResolvedDependency, node: &Component, name: &str, requires: &[String]) -> String {
        let package_folder = dep.package_folder.display();
        let mut out = String::new();
        let _ = writeln!(out, "prefix={package_folder}");
        out.push_str("libdir=${prefix}/lib\n");
        out.push_str("includedir=${prefix}/include\n\n");
        let _ = writeln!(out, "Name: {name}");
        let _ = writeln!(out, "Description: ferrite package for {}", dep.reference);
        let version = node
            .property(properties::SYSTEM_PACKAGE_VERSION)
            .and_then(PropertyValue::as_str)
            .map_or_else(|| dep.reference.version.to_string(), ToString::to_string);
        let _ = writeln!(out, "Version: {version}");
        if !requires.is_empty() {
            let _ = writeln!(out, "Requires: {}", requires.join(" "));
        }
        let mut libs = vec!["-L${libdir}".to_string()];
        libs.extend(node.libs.iter().map(|l| format!("-l{l}")));
        libs.extend(node.system_libs.iter().map(|l| format!("-l{l}")));
        let _ = writeln!(out, "Libs: {}", libs.join(" "));
        let mut cflags = vec!["-I${includedir}".to_string()];
        cflags.extend(node.defines.iter().map(|d| format!("-D{d}")));
        let _ = writeln!(out, "Cflags: {}", cflags.join(" "));
        out
    }

    fn render_alias(alias: &str, canonical: &str, version: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Name: {alias}");
        let _ = writeln!(out, "Description: alias for {canonical}");
        let _ = writeln!(out, "Version: {version}");
        let _ = writeln!(out, "Requires: {canonical}");
        out
    }
}

#[async_trait]
impl Generator for PkgConfigDeps {
    fn name(&self) -> &'static str {
        "PkgConfigDeps"
    }

    async fn generate(&self, ctx: &RecipeContext) -> Result<Vec<PathBuf>, Error> {
        let mut files = Vec::new();
        for dep in ctx.dependencies.iter_host() {
            let root_name =
                CppInfo::pkg_config_name(&dep.cpp_info.root, &dep.reference.name).to_string();
            let version = dep.reference.version.to_string();

            if dep.cpp_info.has_components() {
                let mut component_names = Vec::new();
                for (component_name, component) in dep.cpp_info.components() {
                    let pc_name =
                        CppInfo::pkg_config_name(component, component_name).to_string();
                    let requires: Vec<String> = component
                        .requires
                        .iter()
                        .map(|r| requirement_pc_name(&dep.cpp_info, r))
                        .collect();
                    let path = ctx.generators_folder().join(format!("{pc_name}.pc"));
                    save(&path, &Self::render_pc(dep, component, &pc_name, &requires), false)
                        .await?;
                    files.push(path);
                    write_aliases(ctx, component, &pc_name, &version, &mut files).await?;
                    component_names.push(pc_name);
                }
                // Umbrella file pulling every component in
                let path = ctx.generators_folder().join(format!("{root_name}.pc"));
                save(
                    &path,
                    &Self::render_pc(dep, &dep.cpp_info.root, &root_name, &component_names),
                    false,
                )
                .await?;
                files.push(path);
            } else {
                let path = ctx.generators_folder().join(format!("{root_name}.pc"));
                save(
                    &path,
                    &Self::render_pc(dep, &dep.cpp_info.root, &root_name, &[]),
                    false,
                )
                .await?;
                files.push(path);
            }
            write_aliases(ctx, &dep.cpp_info.root, &root_name, &version, &mut files).await?;
        }
        report_written(ctx, self.name(), &files);
        Ok(files)
    }
}

fn requirement_pc_name(cpp_info: &CppInfo, required: &str) -> String {
    if let Some((_, component)) = required.split_once("::") {
        return component.to_string();
    }
    cpp_info.component(required).map_or_else(
        || required.to_string(),
        |component| CppInfo::pkg_config_name(component, required).to_string(),
    )
}

async fn write_aliases(
    ctx: &RecipeContext,
    node: &Component,
    canonical: &str,
    version: &str,
    files: &mut Vec<PathBuf>,
) -> Result<(), Error> {
    if let Some(PropertyValue::List(aliases)) = node.property(properties::PKG_CONFIG_ALIASES) {
        for alias in aliases {
            let path = ctx.generators_folder().join(format!("{alias}.pc"));
            save(
                &path,
                &PkgConfigDeps::render_alias(alias, canonical, version),
                false,
            )
            .await?;
            files.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrite_types::{RecipeRef, Version};
    use std::collections::BTreeMap;

    fn zlib_dep() -> ResolvedDependency {
        let mut cpp_info = CppInfo::new();
        cpp_info.root.libs.push("z".to_string());
        cpp_info
            .root
            .set_property(properties::PKG_CONFIG_NAME, "zlib");
        ResolvedDependency {
            reference: RecipeRef::new("zlib", Version::parse("1.3.1").unwrap()),
            options: BTreeMap::new(),
            cpp_info,
            package_folder: PathBuf::from("/cache/zlib/pkg"),
        }
    }

    #[test]
    fn pc_file_carries_libs_and_cflags() {
        let dep = zlib_dep();
        let rendered = PkgConfigDeps::render_pc(&dep, &dep.cpp_info.root, "zlib", &[]);
        assert!(rendered.contains("Name: zlib"));
        assert!(rendered.contains("Version: 1.3.1"));
        assert!(rendered.contains("Libs: -L${libdir} -lz"));
        assert!(rendered.contains("Cflags: -I${includedir}"));
    }

    #[test]
    fn alias_redirects_to_canonical() {
        let rendered = PkgConfigDeps::render_alias("zlib-ng-compat", "zlib", "1.3.1");
        assert!(rendered.contains("Requires: zlib"));
    }
}
