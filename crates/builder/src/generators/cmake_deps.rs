//! Dependency-import module generator for CMake
//!
//! Emits a `<FileName>Config.cmake` / `<filename>-targets.cmake` pair per
//! resolved dependency so the upstream project's `find_package` calls land
//! on the packaged artifacts instead of whatever the system carries.

use super::{report_written, Generator};
use crate::source::save;
use async_trait::async_trait;
use ferrite_errors::Error;
use ferrite_recipe::cpp_info::{properties, PropertyValue};
use ferrite_recipe::{Component, RecipeContext, ResolvedDependency};
use std::fmt::Write as _;
use std::path::PathBuf;

/// Dependency config-module generator
#[derive(Default)]
pub struct CMakeDeps {
    /// Build-context packages (code generators and the like) that also get
    /// config modules in the host build
    pub build_context_activated: Vec<String>,
    /// Build modules of build-context packages to include
    pub build_context_build_modules: Vec<String>,
}

impl CMakeDeps {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn render_config(
        dep: &ResolvedDependency,
        file_name: &str,
        targets_file: &str,
        include_build_modules: bool,
    ) -> String {
        let name = &dep.reference.name;
        let package_folder = dep.package_folder.display();
        let mut out = String::new();
        let _ = writeln!(out, "# Config module for {}", dep.reference);
        let mut prefixes = vec![file_name.to_string()];
        if let Some(PropertyValue::List(extra)) = dep
            .cpp_info
            .root
            .property(properties::CMAKE_ADDITIONAL_VARIABLES_PREFIXES)
        {
            prefixes.extend(extra.iter().cloned());
        }
        for prefix in prefixes {
            let _ = writeln!(out, "set({prefix}_FOUND TRUE)");
            let _ = writeln!(out, "set({prefix}_VERSION \"{}\")", dep.reference.version);
            let _ = writeln!(
                out,
                "set({prefix}_INCLUDE_DIRS \"{package_folder}/include\")"
            );
            let _ = writeln!(
                out,
                "set({prefix}_LIBRARIES \"{}\")",
                dep.cpp_info.cmake_target_name(name)
            );
        }
        let _ = writeln!(out, "include(\"${{CMAKE_CURRENT_LIST_DIR}}/{targets_file}\")");
        if include_build_modules {
            if let Some(PropertyValue::List(modules)) =
                dep.cpp_info.root.property(properties::CMAKE_BUILD_MODULES)
            {
                for module in modules {
                    let _ = writeln!(out, "include(\"{package_folder}/{module}\")");
                }
            }
        }
        out
    }

    fn render_targets(dep: &ResolvedDependency) -> String {
        let name = &dep.reference.name;
        let mut out = String::new();
        let _ = writeln!(out, "# Imported targets for {}", dep.reference);

        let mut component_targets = Vec::new();
        for (component_name, component) in dep.cpp_info.components() {
            let target = component_target_name(name, component_name, component);
            Self::render_target(&mut out, dep, &target, component);
            component_targets.push(target);
        }

        let root_target = dep.cpp_info.cmake_target_name(name);
        if component_targets.is_empty() {
            Self::render_target(&mut out, dep, &root_target, &dep.cpp_info.root);
        } else {
            let _ = writeln!(out, "if(NOT TARGET {root_target})");
            let _ = writeln!(out, "  add_library({root_target} INTERFACE IMPORTED)");
            let _ = writeln!(
                out,
                "  set_target_properties({root_target} PROPERTIES INTERFACE_LINK_LIBRARIES \"{}\")",
                component_targets.join(";")
            );
            let _ = writeln!(out, "endif()");
        }

        if let Some(PropertyValue::List(aliases)) = dep
            .cpp_info
            .root
            .property(properties::CMAKE_TARGET_ALIASES)
        {
            for alias in aliases {
                let _ = writeln!(out, "if(NOT TARGET {alias})");
                let _ = writeln!(out, "  add_library({alias} INTERFACE IMPORTED)");
                let _ = writeln!(
                    out,
                    "  set_target_properties({alias} PROPERTIES INTERFACE_LINK_LIBRARIES \"{root_target}\")"
                );
                let _ = writeln!(out, "endif()");
            }
        }
        out
    }

    fn render_target(
        out: &mut String,
        dep: &ResolvedDependency,
        target: &str,
        node: &Component,
    ) {
        let package_folder = dep.package_folder.display();
        let _ = writeln!(out, "if(NOT TARGET {target})");
        let _ = writeln!(out, "  add_library({target} INTERFACE IMPORTED)");
        let include_dirs: Vec<String> = node
            .includedirs
            .iter()
            .map(|d| format!("{package_folder}/{d}"))
            .collect();
        let _ = writeln!(
            out,
            "  set_target_properties({target} PROPERTIES INTERFACE_INCLUDE_DIRECTORIES \"{}\")",
            include_dirs.join(";")
        );
        let lib_dirs: Vec<String> = node
            .libdirs
            .iter()
            .map(|d| format!("{package_folder}/{d}"))
            .collect();
        if !lib_dirs.is_empty() {
            let _ = writeln!(
                out,
                "  set_target_properties({target} PROPERTIES INTERFACE_LINK_DIRECTORIES \"{}\")",
                lib_dirs.join(";")
            );
        }
        let mut link: Vec<String> = node.libs.clone();
        link.extend(node.system_libs.iter().cloned());
        for framework in &node.frameworks {
            link.push(format!("-framework {framework}"));
        }
        for required in &node.requires {
            link.push(requirement_target(&dep.reference.name, dep, required));
        }
        if !link.is_empty() {
            let _ = writeln!(
                out,
                "  set_target_properties({target} PROPERTIES INTERFACE_LINK_LIBRARIES \"{}\")",
                link.join(";")
            );
        }
        if !node.defines.is_empty() {
            let _ = writeln!(
                out,
                "  set_target_properties({target} PROPERTIES INTERFACE_COMPILE_DEFINITIONS \"{}\")",
                node.defines.join(";")
            );
        }
        let _ = writeln!(out, "endif()");
    }
}

fn component_target_name(package: &str, component_name: &str, component: &Component) -> String {
    component
        .property(properties::CMAKE_TARGET_NAME)
        .and_then(PropertyValue::as_str)
        .map_or_else(
            || format!("{package}::{component_name}"),
            ToString::to_string,
        )
}

fn requirement_target(package: &str, dep: &ResolvedDependency, required: &str) -> String {
    // Foreign requirement: pkg::component is already a target name
    if required.contains("::") {
        return required.to_string();
    }
    dep.cpp_info.component(required).map_or_else(
        || format!("{package}::{required}"),
        |component| component_target_name(package, required, component),
    )
}

#[async_trait]
impl Generator for CMakeDeps {
    fn name(&self) -> &'static str {
        "CMakeDeps"
    }

    async fn generate(&self, ctx: &RecipeContext) -> Result<Vec<PathBuf>, Error> {
        let mut files = Vec::new();
        let host: Vec<(&ResolvedDependency, bool)> =
            ctx.dependencies.iter_host().map(|d| (d, true)).collect();
        let build_context: Vec<(&ResolvedDependency, bool)> = ctx
            .dependencies
            .iter_build()
            .filter(|d| self.build_context_activated.contains(&d.reference.name))
            .map(|d| {
                let modules = self
                    .build_context_build_modules
                    .contains(&d.reference.name);
                (d, modules)
            })
            .collect();
        for (dep, include_build_modules) in host.into_iter().chain(build_context) {
            let file_name = dep.cpp_info.cmake_file_name(&dep.reference.name);
            let targets_file = format!("{}-targets.cmake", file_name.to_lowercase());
            let config_path = ctx
                .generators_folder()
                .join(format!("{file_name}Config.cmake"));
            let targets_path = ctx.generators_folder().join(&targets_file);
            save(
                &config_path,
                &Self::render_config(dep, &file_name, &targets_file, include_build_modules),
                false,
            )
            .await?;
            save(&targets_path, &Self::render_targets(dep), false).await?;
            files.push(config_path);
            files.push(targets_path);
        }
        report_written(ctx, self.name(), &files);
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrite_recipe::CppInfo;
    use ferrite_types::{RecipeRef, Version};
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn cjson_dep() -> ResolvedDependency {
        let mut cpp_info = CppInfo::new();
        cpp_info
            .root
            .set_property(properties::CMAKE_FILE_NAME, "cJSON");
        let core = cpp_info.component_mut("_cjson");
        core.libs.push("cjson".to_string());
        core.system_libs.push("m".to_string());
        core.set_property(properties::CMAKE_TARGET_NAME, "cjson::cjson");
        let utils = cpp_info.component_mut("cjson_utils");
        utils.libs.push("cjson_utils".to_string());
        utils.requires.push("_cjson".to_string());
        ResolvedDependency {
            reference: RecipeRef::new("cjson", Version::parse("1.7.18").unwrap()),
            options: BTreeMap::new(),
            cpp_info,
            package_folder: PathBuf::from("/cache/cjson/pkg"),
        }
    }

    #[test]
    fn targets_follow_component_properties() {
        let dep = cjson_dep();
        let rendered = CMakeDeps::render_targets(&dep);
        assert!(rendered.contains("add_library(cjson::cjson INTERFACE IMPORTED)"));
        assert!(rendered.contains("add_library(cjson::cjson_utils INTERFACE IMPORTED)"));
        // The component requirement resolves to the declared target name
        assert!(rendered.contains("INTERFACE_LINK_LIBRARIES \"cjson_utils;cjson::cjson\""));
        assert!(rendered.contains("\"cjson;m\""));
    }

    #[test]
    fn config_module_respects_file_name() {
        let dep = cjson_dep();
        let rendered = CMakeDeps::render_config(&dep, "cJSON", "cjson-targets.cmake", true);
        assert!(rendered.contains("set(cJSON_FOUND TRUE)"));
        assert!(rendered.contains("set(cJSON_VERSION \"1.7.18\")"));
        assert!(rendered.contains("include(\"${CMAKE_CURRENT_LIST_DIR}/cjson-targets.cmake\")"));
    }
}
