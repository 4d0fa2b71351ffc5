//! Hyperedge files: a JSON array of hyperedges, each an array of node labels.
//!
//! Labels may be integers or strings (mixed freely); `[[0, 1, 2], ["a", 3]]` is valid.

use std::fmt;
use std::fs;
use std::path::Path;

use hgsl_core::Hypergraph;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DataError, DataResult};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeLabel {
    Id(i64),
    Name(String),
}

impl fmt::Display for NodeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeLabel::Id(id) => write!(f, "{}", id),
            NodeLabel::Name(name) => f.write_str(name),
        }
    }
}

impl From<i64> for NodeLabel {
    fn from(id: i64) -> Self {
        NodeLabel::Id(id)
    }
}

impl From<&str> for NodeLabel {
    fn from(name: &str) -> Self {
        NodeLabel::Name(name.to_owned())
    }
}

pub fn parse_hyperedges(json: &str) -> DataResult<Vec<Vec<NodeLabel>>> {
    Ok(serde_json::from_str(json)?)
}

/// Reads a hyperedge file and builds the hypergraph (nodes indexed in first-seen order).
pub fn load_hypergraph(path: &Path) -> DataResult<Hypergraph<NodeLabel>> {
    let contents = fs::read_to_string(path).map_err(|e| DataError::io(path, e))?;
    let raw = parse_hyperedges(&contents)?;
    debug!(path = %path.display(), hyperedges = raw.len(), "hyperedge file loaded");
    Ok(Hypergraph::new(raw))
}

/// Writes any serializable artifact as pretty JSON.
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> DataResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| DataError::io(parent, e))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(|e| DataError::io(path, e))
}

pub fn load_json<T: for<'de> Deserialize<'de>>(path: &Path) -> DataResult<T> {
    let contents = fs::read_to_string(path).map_err(|e| DataError::io(path, e))?;
    Ok(serde_json::from_str(&contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_labels() {
        let raw = parse_hyperedges(r#"[[0, 1, 2], ["a", 2], [-4]]"#).unwrap();
        assert_eq!(raw[1], vec![NodeLabel::from("a"), NodeLabel::from(2)]);
        assert_eq!(raw[2][0].to_string(), "-4");

        let hg = Hypergraph::new(raw);
        assert_eq!(hg.n(), 5);
        assert_eq!(hg.index_of(&NodeLabel::from("a")), Some(3));
        assert_eq!(hg.hyperedges()[1], vec![2, 3]);
    }

    #[test]
    fn rejects_non_array_input() {
        assert!(matches!(parse_hyperedges(r#"{"edges": []}"#), Err(DataError::Json(_))));
        assert!(parse_hyperedges("[[1.5]]").is_err());
    }

    #[test]
    fn file_round_trip() {
        let dir = std::env::temp_dir().join(format!("hgsl-io-{}", std::process::id()));
        let path = dir.join("edges.json");
        let edges = vec![vec![NodeLabel::from(1), NodeLabel::from("x")], vec![NodeLabel::from(1)]];
        save_json(&path, &edges).unwrap();

        let hg = load_hypergraph(&path).unwrap();
        assert_eq!(hg.n(), 2);
        assert_eq!(hg.m(), 2);
        assert!(matches!(load_hypergraph(&dir.join("nope.json")), Err(DataError::Io { .. })));
        fs::remove_dir_all(&dir).ok();
    }
}
