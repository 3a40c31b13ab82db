//! Invocation of external command-line tools.
//!
//! [`CommandLineTool`] describes an executable (its name, how it reports its
//! version, which versions are supported) and provides [`CommandLineTool::run`]
//! to execute it with captured output.

use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::Command;

use semver::{Version, VersionReq};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("command `{0}` not found, is it installed and on PATH?")]
    NotFound(String),
    #[error("failed to run `{command}`: {source}")]
    Io {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("`{command}` exited with code {code}: {stderr}")]
    Failed {
        command: String,
        code: i32,
        stderr: String,
    },
    #[error("cannot parse version `{0}`")]
    InvalidVersion(String),
    #[error("`{command}` version {found} does not satisfy requirement {required}")]
    UnsupportedVersion {
        command: String,
        found: Version,
        required: VersionReq,
    },
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

pub trait CommandLineTool {
    /// Name or path of the executable, optionally depending on the working directory.
    fn command(&self, working_dir: Option<&Path>) -> String;

    /// Minimum (or otherwise constrained) supported tool version.
    fn version_requirement(&self) -> VersionReq;

    fn version_arguments(&self) -> &str {
        "--version"
    }

    /// Turn the raw output of the version command into a bare version string.
    fn transform_version(&self, output: &str) -> String {
        output.trim().to_string()
    }

    /// Run the tool with `args` in `working_dir` and capture its output.
    ///
    /// Arguments are passed through unchanged, also when they are not valid UTF-8.
    /// A non-zero exit status is reported as [`ToolError::Failed`].
    fn run(&self, working_dir: Option<&Path>, args: &[OsString]) -> Result<ProcessOutput, ToolError> {
        let program = self.command(working_dir);
        let command_line = render_command_line(&program, args);

        let mut cmd = Command::new(&program);
        cmd.args(args);
        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
        }

        debug!(command = %command_line, cwd = ?working_dir, "running tool");

        let output = cmd.output().map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ToolError::NotFound(program.clone()),
            _ => ToolError::Io {
                command: command_line.clone(),
                source: e,
            },
        })?;

        // Killed by a signal has no exit code.
        let exit_code = output.status.code().unwrap_or(-1);
        let result = ProcessOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code,
        };

        if !output.status.success() {
            return Err(ToolError::Failed {
                command: command_line,
                code: exit_code,
                stderr: result.stderr.trim().to_string(),
            });
        }

        debug!(
            command = %command_line,
            exit_code = result.exit_code,
            stdout_bytes = result.stdout.len(),
            "tool finished"
        );
        Ok(result)
    }

    /// Query the installed version of the tool.
    fn version(&self, working_dir: Option<&Path>) -> Result<Version, ToolError> {
        let args: Vec<OsString> = self
            .version_arguments()
            .split_whitespace()
            .map(OsString::from)
            .collect();
        let output = self.run(working_dir, &args)?;
        let raw = self.transform_version(&output.stdout);
        parse_lenient_version(&raw)
    }

    /// Ensure the installed version satisfies [`CommandLineTool::version_requirement`].
    fn check_version(&self, working_dir: Option<&Path>) -> Result<Version, ToolError> {
        let found = self.version(working_dir)?;
        let required = self.version_requirement();
        if !required.matches(&found) {
            return Err(ToolError::UnsupportedVersion {
                command: self.command(working_dir),
                found,
                required,
            });
        }
        Ok(found)
    }
}

/// Parse a version that may omit minor / patch components (`2` → `2.0.0`, `2.5` → `2.5.0`).
pub fn parse_lenient_version(raw: &str) -> Result<Version, ToolError> {
    let trimmed = raw.trim().trim_start_matches('v');
    if let Ok(version) = Version::parse(trimmed) {
        return Ok(version);
    }

    // Split off pre-release / build suffixes before padding the core.
    let split_at = trimmed.find(['-', '+']).unwrap_or(trimmed.len());
    let (core, suffix) = trimmed.split_at(split_at);
    let mut parts: Vec<&str> = core.split('.').collect();
    if parts.is_empty() || parts.len() > 3 || parts.iter().any(|p| p.is_empty()) {
        return Err(ToolError::InvalidVersion(raw.trim().to_string()));
    }
    while parts.len() < 3 {
        parts.push("0");
    }

    Version::parse(&format!("{}{}", parts.join("."), suffix))
        .map_err(|_| ToolError::InvalidVersion(raw.trim().to_string()))
}

/// Human-readable command line for logs and error messages.
fn render_command_line(program: &str, args: &[OsString]) -> String {
    std::iter::once(program.to_string())
        .chain(args.iter().map(|a| a.to_string_lossy().into_owned()))
        .collect::<Vec<_>>()
        .join(" ")
}
