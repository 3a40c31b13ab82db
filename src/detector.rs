use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::Pattern;

/// Find the definition files at `path` matching any of the file name `patterns`.
///
/// A file path is returned as-is. For a directory only its direct entries are
/// considered; the result is sorted for a stable processing order.
pub fn find_definition_files(path: &Path, patterns: &[&str]) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let matchers = patterns
        .iter()
        .map(|p| Pattern::new(p).with_context(|| format!("Invalid definition file pattern `{p}`")))
        .collect::<Result<Vec<_>>>()?;

    let entries = std::fs::read_dir(path)
        .with_context(|| format!("Failed to read directory {}", path.display()))?;

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| matchers.iter().any(|pattern| pattern.matches(name)))
        })
        .collect();

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATTERNS: &[&str] = &["conanfile*.txt", "conanfile*.py"];

    #[test]
    fn test_pattern_matches_whole_file_name() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["conanfile-test.txt", "conanfile.txt.bak", "conanfileXtxt", "my_conanfile.txt"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }

        let files = find_definition_files(dir.path(), PATTERNS).unwrap();
        assert_eq!(files, vec![dir.path().join("conanfile-test.txt")]);
    }

    #[test]
    fn test_invalid_pattern_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_definition_files(dir.path(), &["conanfile[.txt"]).is_err());
    }

    #[test]
    fn test_find_definition_files_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["conanfile.py", "conanfile.txt", "conanfile_dev.txt", "CMakeLists.txt", "conan.lock"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        std::fs::create_dir(dir.path().join("conanfile_dir.txt")).unwrap();

        let files = find_definition_files(dir.path(), PATTERNS).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["conanfile.py", "conanfile.txt", "conanfile_dev.txt"]);
    }

    #[test]
    fn test_find_definition_files_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("my-recipe.py");
        std::fs::write(&file, "").unwrap();

        let files = find_definition_files(&file, PATTERNS).unwrap();
        assert_eq!(files, vec![file]);
    }

    #[test]
    fn test_find_definition_files_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_definition_files(&dir.path().join("nope"), PATTERNS).is_err());
    }
}
