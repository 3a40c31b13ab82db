//! Typed model of the JSON written by `conan graph info --format json`.
//!
//! Only the fields needed to describe a project are modeled; every other key in
//! the output is ignored. The decoder also accepts trailing commas, which
//! hand-edited fixtures tend to contain.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

/// Node id Conan assigns to the consumer (the project itself).
pub const ROOT_NODE_ID: &str = "0";

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("invalid graph JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a single top-level `graph` key, found {0:?}")]
    UnexpectedTopLevel(Vec<String>),
    #[error("expected the graph root to be node `0`, found {0:?}")]
    UnexpectedRoot(Vec<String>),
    #[error("graph has no node `{0}`")]
    MissingNode(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConanGraphDependency {
    #[serde(rename = "ref")]
    pub reference: String,
    pub direct: bool,
    pub build: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConanGraphNode {
    #[serde(rename = "ref")]
    pub reference: String,
    pub id: String,
    #[serde(default, deserialize_with = "string_or_list")]
    pub license: Vec<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub label: String,
    pub recipe_folder: String,
    #[serde(default)]
    pub dependencies: BTreeMap<String, ConanGraphDependency>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConanGraph {
    #[serde(default)]
    pub nodes: BTreeMap<String, ConanGraphNode>,
    #[serde(default)]
    pub root: BTreeMap<String, String>,
}

impl ConanGraph {
    /// The consumer node. The root map must point at node `0` and nothing else.
    pub fn root_node(&self) -> Result<&ConanGraphNode, GraphError> {
        if self.root.len() != 1 || !self.root.contains_key(ROOT_NODE_ID) {
            return Err(GraphError::UnexpectedRoot(self.root.keys().cloned().collect()));
        }
        self.nodes
            .get(ROOT_NODE_ID)
            .ok_or_else(|| GraphError::MissingNode(ROOT_NODE_ID.to_string()))
    }
}

/// Decode the output of `conan graph info --format json`.
pub fn parse_conan_graph(s: &str) -> Result<ConanGraph, GraphError> {
    let cleaned = strip_trailing_commas(s);
    let mut top_level: BTreeMap<String, Value> = serde_json::from_str(&cleaned)?;

    match top_level.remove("graph") {
        Some(graph) if top_level.is_empty() => Ok(serde_json::from_value(graph)?),
        graph => {
            let mut keys: Vec<String> = top_level.into_keys().collect();
            if graph.is_some() {
                keys.push("graph".to_string());
                keys.sort();
            }
            Err(GraphError::UnexpectedTopLevel(keys))
        }
    }
}

/// Conan recipes declare `license` either as a string or as a tuple of strings.
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(s)) => vec![s],
        Some(OneOrMany::Many(v)) => v,
    })
}

/// Remove commas that follow a value and directly precede a closing `}` or `]`,
/// ignoring whitespace. A comma right after `{`, `[` or another comma is kept so
/// that the JSON parser still rejects it. String literals are copied untouched.
fn strip_trailing_commas(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut in_string = false;
    let mut escaped = false;
    // Last character emitted outside whitespace, used to tell a trailing comma
    // (after a value) from a stray one.
    let mut last = None;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
                last = Some('"');
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let next = chars[i + 1..].iter().find(|n| !n.is_whitespace());
                let after_value = !matches!(last, None | Some('{') | Some('[') | Some(','));
                if !(after_value && matches!(next, Some('}') | Some(']'))) {
                    out.push(c);
                }
                last = Some(',');
            }
            _ => {
                out.push(c);
                if !c.is_whitespace() {
                    last = Some(c);
                }
            }
        }
    }

    out
}
