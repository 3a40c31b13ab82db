use std::collections::{BTreeMap, BTreeSet};
use std::ffi::{OsStr, OsString};
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{anyhow, Context, Result};
use semver::VersionReq;
use tracing::{debug, info};

use crate::graph::{parse_conan_graph, ConanGraphNode};
use crate::models::{Identifier, Project, ProjectAnalyzerResult, VcsInfo};
use crate::tool::CommandLineTool;

use super::PackageManager;

/// Option naming the lockfile to analyze against instead of resolving dynamically.
pub const OPTION_LOCKFILE_NAME: &str = "lockfileName";

pub const MANAGER_NAME: &str = "Conan2";

const DEFAULT_COMMAND: &str = "conan";

/// Oldest supported Conan release.
static VERSION_REQUIREMENT: LazyLock<VersionReq> =
    LazyLock::new(|| VersionReq::parse(">=2.5").expect("static version requirement is valid"));

/// Conan reports its version as `Conan version 2.5.0`.
const VERSION_PREFIX: &str = "Conan version ";

const DEFINITION_FILE_PATTERNS: &[&str] = &["conanfile*.txt", "conanfile*.py"];

/// Lets Conan compute a graph without a detected default profile.
const DUMMY_COMPILER_SETTINGS: &[&str] = &[
    "-s",
    "compiler=gcc",
    "-s",
    "compiler.libcxx=libstdc++",
    "-s",
    "compiler.version=11.1",
];

/// The [Conan](https://conan.io/) package manager for C / C++, version 2.x.
///
/// Supported options:
/// - `lockfileName`: lockfile passed to `conan graph info`, resolved relative to
///   the definition file's directory. Only one lockfile per project is supported.
pub struct Conan2 {
    analysis_root: PathBuf,
    options: BTreeMap<String, String>,
    command: String,
}

impl Conan2 {
    pub fn new(analysis_root: impl Into<PathBuf>, options: BTreeMap<String, String>) -> Self {
        Self {
            analysis_root: analysis_root.into(),
            options,
            command: DEFAULT_COMMAND.to_string(),
        }
    }

    /// Use a different executable than `conan` from `PATH`.
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    pub fn lockfile_name(&self) -> Option<&str> {
        self.options.get(OPTION_LOCKFILE_NAME).map(String::as_str)
    }

    /// Arguments of the `conan graph info` call for `definition_file_name`.
    fn graph_info_args(&self, definition_file_name: &OsStr) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["graph".into(), "info".into(), definition_file_name.into()];

        let rest: Vec<&str> = match self.lockfile_name() {
            None => ["--format", "json"]
                .into_iter()
                .chain(DUMMY_COMPILER_SETTINGS.iter().copied())
                .collect(),
            Some(lockfile) => vec!["-l", lockfile, "--format", "json"],
        };
        args.extend(rest.into_iter().map(OsString::from));

        args
    }

    fn project_result(&self, definition_file: &Path, node: &ConanGraphNode) -> ProjectAnalyzerResult {
        let project = Project {
            id: Identifier {
                kind: self.name().to_string(),
                namespace: String::new(),
                name: node.name.clone().unwrap_or_default(),
                version: node.version.clone().unwrap_or_default(),
            },
            definition_file_path: relative_path(&self.analysis_root, definition_file),
            authors: BTreeSet::from([node.author.clone().unwrap_or_default()]),
            declared_licenses: node.license.iter().cloned().collect(),
            vcs: VcsInfo::from_url(node.url.as_deref().unwrap_or_default()),
            homepage_url: node.homepage.clone().unwrap_or_default(),
        };

        ProjectAnalyzerResult {
            project,
            packages: BTreeSet::new(),
        }
    }
}

impl CommandLineTool for Conan2 {
    fn command(&self, _working_dir: Option<&Path>) -> String {
        self.command.clone()
    }

    fn version_requirement(&self) -> VersionReq {
        VERSION_REQUIREMENT.clone()
    }

    fn transform_version(&self, output: &str) -> String {
        let trimmed = output.trim();
        trimmed
            .strip_prefix(VERSION_PREFIX)
            .unwrap_or(trimmed)
            .trim()
            .to_string()
    }
}

impl PackageManager for Conan2 {
    fn name(&self) -> &str {
        MANAGER_NAME
    }

    fn definition_file_patterns(&self) -> &[&str] {
        DEFINITION_FILE_PATTERNS
    }

    fn resolve_dependencies(&self, definition_file: &Path) -> Result<Vec<ProjectAnalyzerResult>> {
        let file_name = definition_file
            .file_name()
            .ok_or_else(|| anyhow!("{} is not a file", definition_file.display()))?;
        let working_dir = match definition_file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let args = self.graph_info_args(file_name);
        let output = self
            .run(Some(working_dir), &args)
            .with_context(|| format!("conan graph info failed for {}", definition_file.display()))?;

        let graph = parse_conan_graph(&output.stdout)
            .with_context(|| format!("Failed to parse Conan graph of {}", definition_file.display()))?;
        debug!(nodes = graph.nodes.len(), file = %definition_file.display(), "parsed conan graph");

        let root = graph
            .root_node()
            .with_context(|| format!("Unexpected Conan graph root for {}", definition_file.display()))?;

        let result = self.project_result(definition_file, root);
        info!(project = %result.project.id, file = %result.project.definition_file_path, "resolved project");

        Ok(vec![result])
    }
}

/// Path of `path` relative to `root`, `/`-separated. Paths outside `root` are kept as given.
fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            Component::RootDir | Component::Prefix(_) | Component::CurDir => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
