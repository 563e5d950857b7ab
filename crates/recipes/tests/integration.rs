//! End-to-end scenarios for the representative recipe set

use ferrite_builder::{AutotoolsToolchain, CargoBuild, Generator};
use ferrite_recipe::cpp_info::properties;
use ferrite_recipe::{
    apply_implements, CompilerSettings, Layout, LifecycleDriver, NullResolver, Options,
    PackageIdInfo, PropertyValue, Recipe, RecipeContext, Settings, SourceCache,
};
use ferrite_types::{Arch, BuildType, CompilerKind, Libcxx, MsvcRuntime, Os, PackageType};
use ferrite_recipes::{Cjson, Cudart, Eigen, Flite, Llguidance};
use std::path::Path;

fn linux_profile(kind: CompilerKind) -> Settings {
    Settings {
        os: Some(Os::Linux),
        arch: Some(Arch::X86_64),
        compiler: Some(CompilerSettings {
            kind,
            version: Some("13".to_string()),
            libcxx: Some(Libcxx::Libstdcxx11),
            cppstd: Some(17),
            cstd: None,
            runtime: None,
        }),
        build_type: Some(BuildType::Release),
        cuda: None,
    }
}

fn windows_msvc_profile() -> Settings {
    Settings {
        os: Some(Os::Windows),
        arch: Some(Arch::X86_64),
        compiler: Some(CompilerSettings {
            kind: CompilerKind::Msvc,
            version: Some("194".to_string()),
            libcxx: None,
            cppstd: Some(17),
            cstd: None,
            runtime: Some(MsvcRuntime::MD),
        }),
        build_type: Some(BuildType::Release),
        cuda: None,
    }
}

fn context_for(recipe: &dyn Recipe, settings: Settings, base: &Path) -> RecipeContext {
    let mut options = Options::new();
    recipe.declare_options(&mut options);
    RecipeContext::new(
        recipe.metadata().reference(),
        settings.clone(),
        settings,
        options,
        base.to_path_buf(),
    )
}

async fn seed_eigen_sources(base: &Path) {
    let src = base.join("src");
    tokio::fs::create_dir_all(src.join("Eigen")).await.unwrap();
    tokio::fs::write(src.join("Eigen/Core"), "// Eigen core header\n")
        .await
        .unwrap();
    tokio::fs::create_dir_all(src.join("unsupported/Eigen"))
        .await
        .unwrap();
    tokio::fs::write(src.join("unsupported/Eigen/FFT"), "// FFT\n")
        .await
        .unwrap();
    tokio::fs::write(src.join("COPYING.MPL2"), "Mozilla Public License 2.0\n")
        .await
        .unwrap();
}

fn primed_cache(recipe: &dyn Recipe) -> SourceCache {
    let mut cache = SourceCache::new();
    let reference = recipe.metadata().reference();
    let digest = ferrite_manifest::RecipeManifest::default()
        .patch_digest(reference.version.as_str());
    cache.mark(&reference, &digest);
    cache
}

#[tokio::test]
async fn header_only_lifecycle_packages_headers() {
    let dir = tempfile::tempdir().unwrap();
    seed_eigen_sources(dir.path()).await;

    let resolver = NullResolver;
    let mut driver = LifecycleDriver::new(&resolver).with_source_cache(primed_cache(&Eigen));
    let ctx = context_for(&Eigen, linux_profile(CompilerKind::Gcc), dir.path());
    let captured = driver.run(&Eigen, ctx).await.unwrap();

    assert_eq!(captured.package_type, PackageType::HeaderLibrary);
    assert!(dir.path().join("package/include/eigen3/Eigen/Core").is_file());
    assert!(dir.path().join("package/licenses/COPYING.MPL2").is_file());
    assert_eq!(
        captured.metadata.cpp_info.cmake_file_name("eigen"),
        "Eigen3"
    );
    assert_eq!(
        captured.metadata.cpp_info.cmake_target_name("eigen"),
        "Eigen3::Eigen"
    );
}

#[tokio::test]
async fn header_only_id_ignores_the_profile() {
    let dir = tempfile::tempdir().unwrap();
    seed_eigen_sources(dir.path()).await;

    let resolver = NullResolver;
    let mut driver = LifecycleDriver::new(&resolver).with_source_cache(primed_cache(&Eigen));
    let gcc = driver
        .run(
            &Eigen,
            context_for(&Eigen, linux_profile(CompilerKind::Gcc), dir.path()),
        )
        .await
        .unwrap();
    let clang = driver
        .run(
            &Eigen,
            context_for(&Eigen, linux_profile(CompilerKind::Clang), dir.path()),
        )
        .await
        .unwrap();
    assert_eq!(gcc.package_id, clang.package_id);
}

#[tokio::test]
async fn cjson_component_graph() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context_for(&Cjson, linux_profile(CompilerKind::Gcc), dir.path());
    ctx.options.set("utils", true).unwrap();
    Cjson.configure(&mut ctx).unwrap();

    let metadata = Cjson.package_info(&ctx).unwrap();
    let core = metadata.cpp_info.component("_cjson").unwrap();
    assert_eq!(core.libs, vec!["cjson".to_string()]);
    assert_eq!(core.system_libs, vec!["m".to_string()]);
    let utils = metadata.cpp_info.component("cjson_utils").unwrap();
    assert_eq!(utils.requires, vec!["_cjson".to_string()]);

    // Every component requirement resolves
    metadata
        .cpp_info
        .validate(ctx.reference(), PackageType::Library)
        .unwrap();
}

#[tokio::test]
async fn cjson_toolchain_reflects_options() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context_for(&Cjson, linux_profile(CompilerKind::Gcc), dir.path());
    ctx.options.set("utils", true).unwrap();
    ctx.set_layout(Layout::cmake(dir.path(), BuildType::Release));

    Cjson.generate(&mut ctx).await.unwrap();
    let toolchain = ctx
        .generators_folder()
        .join(ferrite_builder::generators::CMAKE_TOOLCHAIN_FILE);
    let contents = tokio::fs::read_to_string(&toolchain).await.unwrap();
    assert!(contents.contains("set(ENABLE_CJSON_UTILS \"ON\""));
    assert!(contents.contains("set(ENABLE_LOCALES \"ON\""));
    assert!(contents.contains("set(BUILD_SHARED_LIBS \"OFF\""));
}

#[tokio::test]
async fn shared_build_erases_fpic_from_identity() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context_for(&Cjson, linux_profile(CompilerKind::Gcc), dir.path());
    ctx.options.set("shared", true).unwrap();
    Cjson.configure(&mut ctx).unwrap();
    let metadata = Cjson.metadata();
    apply_implements(&metadata.implements, &mut ctx, metadata.package_type);

    assert!(ctx.options.is_erased("fPIC"));
    let info = PackageIdInfo::new(ctx.reference(), &ctx.settings, &ctx.options);
    assert!(!info.has_option("fPIC"));
    assert!(info.has_option("shared"));
}

#[tokio::test]
async fn flite_wraps_msvc_tools() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context_for(&Flite, windows_msvc_profile(), dir.path());
    Flite.configure(&mut ctx).unwrap();
    assert!(ctx.win_bash);
    assert!(ctx.options.is_erased("fPIC"));

    Flite.build_requirements(&mut ctx).unwrap();
    let tools: Vec<&str> = ctx
        .requirements()
        .edges()
        .iter()
        .map(|e| e.name.as_str())
        .collect();
    assert!(tools.contains(&"automake"));
    assert!(tools.contains(&"msys2"));

    let toolchain = AutotoolsToolchain::new(&ctx);
    assert_eq!(
        toolchain.env.get("CC").map(String::as_str),
        Some("compile cl -nologo")
    );
    assert_eq!(
        toolchain.env.get("AR").map(String::as_str),
        Some("ar-lib lib")
    );
    let files = toolchain.generate(&ctx).await.unwrap();
    assert!(files.iter().any(|f| f.ends_with("ferrite_autotools.sh")));
}

#[tokio::test]
async fn cudart_validates_the_target() {
    let dir = tempfile::tempdir().unwrap();
    let mut macos = linux_profile(CompilerKind::AppleClang);
    macos.os = Some(Os::Macos);
    let ctx = context_for(&Cudart, macos, dir.path());
    assert!(Cudart.validate(&ctx).is_err());

    let mut linux = linux_profile(CompilerKind::Gcc);
    linux.cuda = Some(ferrite_recipe::CudaSettings {
        version: "12.4".to_string(),
    });
    let ctx = context_for(&Cudart, linux, dir.path());
    Cudart.validate(&ctx).unwrap();
}

#[tokio::test]
async fn cudart_identity_ignores_compiler_and_build_type() {
    let dir = tempfile::tempdir().unwrap();
    let mut release = linux_profile(CompilerKind::Gcc);
    release.cuda = Some(ferrite_recipe::CudaSettings {
        version: "12.4".to_string(),
    });
    let mut debug = linux_profile(CompilerKind::Clang);
    debug.build_type = Some(BuildType::Debug);
    debug.cuda = Some(ferrite_recipe::CudaSettings {
        version: "12.4".to_string(),
    });

    let ctx_a = context_for(&Cudart, release, dir.path());
    let ctx_b = context_for(&Cudart, debug, dir.path());
    let mut info_a = PackageIdInfo::new(ctx_a.reference(), &ctx_a.settings, &ctx_a.options);
    let mut info_b = PackageIdInfo::new(ctx_b.reference(), &ctx_b.settings, &ctx_b.options);
    Cudart.package_id(&mut info_a).unwrap();
    Cudart.package_id(&mut info_b).unwrap();
    assert_eq!(info_a.compute(), info_b.compute());
    // The CUDA version still differentiates
    assert!(info_a.has_setting("cuda.version"));
}

#[tokio::test]
async fn cudart_publishes_the_cuda_targets() {
    let dir = tempfile::tempdir().unwrap();
    let mut linux = linux_profile(CompilerKind::Gcc);
    linux.cuda = Some(ferrite_recipe::CudaSettings {
        version: "12.4".to_string(),
    });
    let ctx = context_for(&Cudart, linux, dir.path());
    let metadata = Cudart.package_info(&ctx).unwrap();

    let cudart = metadata.cpp_info.component("cudart").unwrap();
    assert_eq!(
        cudart
            .property(properties::CMAKE_TARGET_NAME)
            .and_then(PropertyValue::as_str),
        Some("CUDA::cudart")
    );
    let devrt = metadata.cpp_info.component("cudadevrt").unwrap();
    assert_eq!(devrt.libs, vec!["cudadevrt".to_string()]);
    assert!(!metadata.buildenv_info.is_empty());
    assert!(!metadata.runenv_info.is_empty());
    metadata
        .cpp_info
        .validate(ctx.reference(), PackageType::SharedLibrary)
        .unwrap();
}

#[tokio::test]
async fn llguidance_cargo_surface() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context_for(
        &Llguidance,
        linux_profile(CompilerKind::Gcc),
        dir.path(),
    );
    Llguidance.build_requirements(&mut ctx).unwrap();
    assert_eq!(ctx.requirements().edges().len(), 1);
    assert_eq!(ctx.requirements().edges()[0].name, "rust");

    assert_eq!(CargoBuild::crate_type(&ctx), "staticlib");
    let cargo = CargoBuild::new(&ctx, "llguidance");
    assert_eq!(cargo.artifact_name(Os::Linux, false), "libllguidance.a");
    assert_eq!(cargo.artifact_name(Os::Windows, false), "llguidance.lib");

    let metadata = Llguidance.package_info(&ctx).unwrap();
    assert_eq!(metadata.cpp_info.root.libs, vec!["llguidance".to_string()]);
}
