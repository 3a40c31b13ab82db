use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// Root configuration structure, deserialized from `.conan-scan/config.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub conan: ConanConfig,
}

/// Settings of the Conan integration.
#[derive(Debug, Deserialize)]
pub struct ConanConfig {
    /// Executable invoked for `conan graph info`. Defaults to `conan` from `PATH`.
    #[serde(default = "default_command")]
    pub command: String,
    /// Skip the `conan --version` requirement check.
    #[serde(default)]
    pub skip_version_check: bool,
    /// Package manager options, e.g. `lockfileName = "conan.lock"`.
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

fn default_command() -> String {
    "conan".to_string()
}

impl Default for ConanConfig {
    fn default() -> Self {
        ConanConfig {
            command: default_command(),
            skip_version_check: false,
            options: BTreeMap::new(),
        }
    }
}

/// Load the configuration, searching in order:
///
/// 1. `config_override`, the path passed via `--config`
/// 2. `<analysis_root>/.conan-scan/config.toml`
/// 3. `~/.config/conan-scan/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(analysis_root: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let project_config = analysis_root.join(".conan-scan").join("config.toml");
    if project_config.exists() {
        return read_config(&project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home.join(".config").join("conan-scan").join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Invalid config {}", path.display()))
}

/// Parse a `key=value` option as given on the command line.
pub fn parse_option(raw: &str) -> Result<(String, String)> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("option `{raw}` is not of the form key=value");
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("option `{raw}` has an empty key");
    }
    Ok((key.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.conan.command, "conan");
        assert!(!config.conan.skip_version_check);
        assert!(config.conan.options.is_empty());
    }

    #[test]
    fn test_parse_toml() {
        let config: Config = toml::from_str(
            r#"
[conan]
command = "/opt/conan/bin/conan"

[conan.options]
lockfileName = "conan.lock"
"#,
        )
        .unwrap();
        assert_eq!(config.conan.command, "/opt/conan/bin/conan");
        assert_eq!(config.conan.options["lockfileName"], "conan.lock");
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.conan.command, "conan");
    }

    #[test]
    fn test_load_project_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join(".conan-scan");
        std::fs::create_dir(&config_dir).unwrap();
        std::fs::write(
            config_dir.join("config.toml"),
            "[conan]\nskip_version_check = true\n",
        )
        .unwrap();

        let config = load_config(dir.path(), None).unwrap();
        assert!(config.conan.skip_version_check);
    }

    #[test]
    fn test_load_override_takes_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join(".conan-scan");
        std::fs::create_dir(&config_dir).unwrap();
        std::fs::write(config_dir.join("config.toml"), "[conan]\ncommand = \"a\"\n").unwrap();
        let override_path = dir.path().join("other.toml");
        std::fs::write(&override_path, "[conan]\ncommand = \"b\"\n").unwrap();

        let config = load_config(dir.path(), Some(&override_path)).unwrap();
        assert_eq!(config.conan.command, "b");
    }

    #[test]
    fn test_invalid_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[conan\n").unwrap();
        assert!(load_config(dir.path(), Some(&path)).is_err());
    }

    #[test]
    fn test_parse_option() {
        assert_eq!(
            parse_option("lockfileName=conan.lock").unwrap(),
            ("lockfileName".to_string(), "conan.lock".to_string())
        );
        assert_eq!(parse_option("a=b=c").unwrap().1, "b=c");
        assert!(parse_option("novalue").is_err());
        assert!(parse_option("=x").is_err());
    }
}
