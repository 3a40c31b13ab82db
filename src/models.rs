use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Unique identity of a project or package: `kind:namespace:name:version`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Identifier {
    /// Package manager the identity belongs to, e.g. `Conan2`.
    #[serde(rename = "type")]
    pub kind: String,
    pub namespace: String,
    pub name: String,
    pub version: String,
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.kind, self.namespace, self.name, self.version
        )
    }
}

/// Version control location as reported by the package metadata.
///
/// Only the raw URL is kept; splitting it into type, revision and path is left
/// to the consumer of the results.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VcsInfo {
    pub url: String,
}

impl VcsInfo {
    pub fn from_url(url: &str) -> Self {
        Self {
            url: url.trim().to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.url.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: Identifier,
    /// Definition file path relative to the analysis root, `/`-separated.
    pub definition_file_path: String,
    pub authors: BTreeSet<String>,
    pub declared_licenses: BTreeSet<String>,
    pub vcs: VcsInfo,
    pub homepage_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Package {
    pub id: Identifier,
    pub authors: BTreeSet<String>,
    pub declared_licenses: BTreeSet<String>,
    pub vcs: VcsInfo,
    pub homepage_url: String,
}

/// Outcome of analyzing a single project definition file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectAnalyzerResult {
    pub project: Project,
    pub packages: BTreeSet<Package>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_display() {
        let id = Identifier {
            kind: "Conan2".to_string(),
            namespace: String::new(),
            name: "libcurl".to_string(),
            version: "7.85.0".to_string(),
        };
        assert_eq!(id.to_string(), "Conan2::libcurl:7.85.0");

        let namespaced = Identifier {
            namespace: "acme".to_string(),
            ..id
        };
        assert_eq!(namespaced.to_string(), "Conan2:acme:libcurl:7.85.0");
    }

    #[test]
    fn test_identifier_serializes_kind_as_type() {
        let id = Identifier {
            kind: "Conan2".to_string(),
            namespace: String::new(),
            name: "zlib".to_string(),
            version: "1.3".to_string(),
        };
        let json = serde_json::to_value(&id).unwrap();
        assert_eq!(json["type"], "Conan2");
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn test_vcs_from_url_trims() {
        let vcs = VcsInfo::from_url("  https://github.com/conan-io/conan-center-index ");
        assert_eq!(vcs.url, "https://github.com/conan-io/conan-center-index");
        assert!(VcsInfo::from_url("").is_empty());
    }
}
