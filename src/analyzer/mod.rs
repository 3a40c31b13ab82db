use std::path::Path;

use anyhow::Result;

use crate::models::ProjectAnalyzerResult;

pub mod conan;

/// A package manager integration: turns one definition file into project results.
pub trait PackageManager {
    /// Name used as the identifier type of every emitted project and package.
    fn name(&self) -> &str;

    /// File name globs of the definition files this manager understands.
    fn definition_file_patterns(&self) -> &[&str];

    fn resolve_dependencies(&self, definition_file: &Path) -> Result<Vec<ProjectAnalyzerResult>>;
}
