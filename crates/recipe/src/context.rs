//! The host-API surface handed to every lifecycle hook

use crate::conf::Conf;
use crate::deps::{Dependencies, RequirementEdge, RequirementKind, RequirementSet};
use crate::layout::Layout;
use crate::options::{OptionValue, Options};
use crate::settings::Settings;
use ferrite_errors::{BuildError, Error};
use ferrite_events::{AppEvent, BuildEvent, EventEmitter, EventSender};
use ferrite_manifest::RecipeManifest;
use ferrite_types::RecipeRef;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Captured output of one shell-out
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Everything a recipe can see and touch while its hooks run
///
/// The context is created by the host, threaded through the lifecycle, and
/// mutated only where the contract allows (options in `configure`, edges in
/// `requirements`/`build_requirements`).
pub struct RecipeContext {
    reference: RecipeRef,
    /// Profile of what the built code will target
    pub settings: Settings,
    /// Profile of the machine doing the building
    pub settings_build: Settings,
    pub options: Options,
    pub conf: Conf,
    /// Route shell-outs through a POSIX shell (msys2 on Windows)
    pub win_bash: bool,
    /// Per-version declarative sidecar (sources, patches)
    pub manifest: RecipeManifest,
    /// Resolved dependency graph, populated before `generate`
    pub dependencies: Dependencies,
    base_folder: PathBuf,
    layout: Layout,
    requirements: RequirementSet,
    provides: Vec<String>,
    dep_option_prefs: Vec<(String, String, OptionValue)>,
    events: Option<EventSender>,
}

impl RecipeContext {
    /// Create a context rooted at `base_folder` with a basic layout
    #[must_use]
    pub fn new(
        reference: RecipeRef,
        settings: Settings,
        settings_build: Settings,
        options: Options,
        base_folder: PathBuf,
    ) -> Self {
        let layout = Layout::basic(&base_folder);
        Self {
            reference,
            settings,
            settings_build,
            options,
            conf: Conf::new(),
            win_bash: false,
            manifest: RecipeManifest::default(),
            dependencies: Dependencies::new(),
            base_folder,
            layout,
            requirements: RequirementSet::new(),
            provides: Vec::new(),
            dep_option_prefs: Vec::new(),
            events: None,
        }
    }

    /// Attach the host configuration
    #[must_use]
    pub fn with_conf(mut self, conf: Conf) -> Self {
        self.conf = conf;
        self
    }

    /// Attach the sidecar manifest
    #[must_use]
    pub fn with_manifest(mut self, manifest: RecipeManifest) -> Self {
        self.manifest = manifest;
        self
    }

    /// Attach an event channel
    #[must_use]
    pub fn with_events(mut self, sender: EventSender) -> Self {
        self.events = Some(sender);
        self
    }

    /// Reference of the recipe being driven
    #[must_use]
    pub fn reference(&self) -> &RecipeRef {
        &self.reference
    }

    /// Root under which the folder roles live
    #[must_use]
    pub fn base_folder(&self) -> &Path {
        &self.base_folder
    }

    /// Current folder layout
    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Bind the folder roles (driver side, during the layout state)
    pub fn set_layout(&mut self, layout: Layout) {
        self.layout = layout;
    }

    #[must_use]
    pub fn source_folder(&self) -> &Path {
        &self.layout.source_folder
    }

    #[must_use]
    pub fn build_folder(&self) -> &Path {
        &self.layout.build_folder
    }

    #[must_use]
    pub fn generators_folder(&self) -> &Path {
        &self.layout.generators_folder
    }

    #[must_use]
    pub fn package_folder(&self) -> &Path {
        &self.layout.package_folder
    }

    /// Folder recipe-local files (patches) are exported into
    #[must_use]
    pub fn export_sources_folder(&self) -> PathBuf {
        self.base_folder.join("export_sources")
    }

    /// Append a host-context dependency edge
    ///
    /// # Errors
    ///
    /// Returns a `VersionError` when the spec does not parse.
    pub fn requires(&mut self, spec: &str) -> Result<(), Error> {
        let edge = RequirementEdge::parse(spec, RequirementKind::Requires)?;
        self.requirements.add(edge);
        Ok(())
    }

    /// Append a build-context tool edge
    ///
    /// # Errors
    ///
    /// Returns a `VersionError` when the spec does not parse.
    pub fn tool_requires(&mut self, spec: &str) -> Result<(), Error> {
        let edge = RequirementEdge::parse(spec, RequirementKind::ToolRequires)?;
        self.requirements.add(edge);
        Ok(())
    }

    /// Append a legacy build-context edge
    ///
    /// # Errors
    ///
    /// Returns a `VersionError` when the spec does not parse.
    pub fn build_requires(&mut self, spec: &str) -> Result<(), Error> {
        let edge = RequirementEdge::parse(spec, RequirementKind::BuildRequires)?;
        self.requirements.add(edge);
        Ok(())
    }

    /// Append a test-only dependency edge
    ///
    /// # Errors
    ///
    /// Returns a `VersionError` when the spec does not parse.
    pub fn test_requires(&mut self, spec: &str) -> Result<(), Error> {
        let edge = RequirementEdge::parse(spec, RequirementKind::TestRequires)?;
        self.requirements.add(edge);
        Ok(())
    }

    /// Append a fully configured edge
    pub fn add_requirement(&mut self, edge: RequirementEdge) {
        self.requirements.add(edge);
    }

    /// Edge set accumulated so far
    #[must_use]
    pub fn requirements(&self) -> &RequirementSet {
        &self.requirements
    }

    /// Record a preference for a dependency option (from `configure`)
    pub fn default_dep_option(
        &mut self,
        dep: impl Into<String>,
        option: impl Into<String>,
        value: impl Into<OptionValue>,
    ) {
        self.dep_option_prefs
            .push((dep.into(), option.into(), value.into()));
    }

    /// Recorded dependency option preferences
    #[must_use]
    pub fn dep_option_prefs(&self) -> &[(String, String, OptionValue)] {
        &self.dep_option_prefs
    }

    /// Replace what this package provides (from `configure`)
    pub fn set_provides(&mut self, provides: Vec<String>) {
        self.provides = provides;
    }

    /// Current provides list
    #[must_use]
    pub fn provides(&self) -> &[String] {
        &self.provides
    }

    /// Shell out to an external tool
    ///
    /// Honors `win_bash` by routing the command line through a POSIX shell.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::CommandFailed` on a non-zero exit and an I/O
    /// error when the program cannot be spawned.
    pub async fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
    ) -> Result<RunOutput, Error> {
        self.run_with_env(program, args, cwd, &HashMap::new()).await
    }

    /// Shell out with extra environment variables
    ///
    /// # Errors
    ///
    /// Returns `BuildError::CommandFailed` on a non-zero exit and an I/O
    /// error when the program cannot be spawned.
    pub async fn run_with_env(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
        env: &HashMap<String, String>,
    ) -> Result<RunOutput, Error> {
        let command_line = if args.is_empty() {
            program.to_string()
        } else {
            format!("{program} {}", args.join(" "))
        };
        let working_dir = cwd.unwrap_or_else(|| self.build_folder()).to_path_buf();

        let mut cmd = if self.win_bash {
            let shell = self
                .conf
                .get(crate::conf::keys::WIN_BASH_PATH)
                .unwrap_or("bash");
            let mut cmd = tokio::process::Command::new(shell);
            cmd.arg("-c").arg(&command_line);
            cmd
        } else {
            let mut cmd = tokio::process::Command::new(program);
            cmd.args(args);
            cmd
        };
        cmd.current_dir(&working_dir);
        cmd.envs(env);

        self.emit(AppEvent::Build(BuildEvent::CommandStarted {
            reference: self.reference.to_string(),
            command: command_line.clone(),
            working_dir: working_dir.clone(),
        }));

        let output = cmd.output().await.map_err(|e| {
            Error::from(BuildError::CommandFailed {
                command: command_line.clone(),
                code: None,
                stderr: e.to_string(),
            })
        })?;

        let result = RunOutput {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        self.emit(AppEvent::Build(BuildEvent::CommandCompleted {
            reference: self.reference.to_string(),
            command: command_line.clone(),
            exit_code: result.exit_code,
        }));

        if !result.success {
            return Err(BuildError::CommandFailed {
                command: command_line,
                code: result.exit_code,
                stderr: result.stderr,
            }
            .into());
        }
        Ok(result)
    }
}

impl EventEmitter for RecipeContext {
    fn event_sender(&self) -> Option<&EventSender> {
        self.events.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrite_types::Version;

    fn context() -> RecipeContext {
        RecipeContext::new(
            RecipeRef::new("demo", Version::parse("1.0").unwrap()),
            Settings::default(),
            Settings::default(),
            Options::new(),
            PathBuf::from("/tmp/demo"),
        )
    }

    #[test]
    fn folder_roles_follow_layout() {
        let mut ctx = context();
        assert!(ctx.source_folder().ends_with("src"));
        ctx.set_layout(Layout::cmake(
            Path::new("/tmp/demo"),
            ferrite_types::BuildType::Release,
        ));
        assert!(ctx.build_folder().ends_with("build/Release"));
    }

    #[test]
    fn edges_accumulate_per_bucket() {
        let mut ctx = context();
        ctx.requires("zlib/[>=1.2]").unwrap();
        ctx.tool_requires("cmake/[>=3.25]").unwrap();
        assert_eq!(ctx.requirements().edges().len(), 2);
    }

    #[tokio::test]
    async fn failing_command_maps_to_command_failed() {
        let ctx = context();
        let err = ctx
            .run("false", &[], Some(Path::new("/tmp")))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Build(BuildError::CommandFailed { .. })
        ));
    }
}
