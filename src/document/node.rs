use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Identifies the node(s) a step operates on.
///
/// In patch files this is written as `{ name = "..." }` or `{ id = "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeSelector {
    /// Matches on the human-readable `name` key.
    Name(String),
    /// Matches on the stable `id` key.
    Id(String),
}

impl NodeSelector {
    pub fn matches(&self, node: &Value) -> bool {
        match self {
            NodeSelector::Name(name) => node_name(node) == Some(name.as_str()),
            NodeSelector::Id(id) => node_id(node) == Some(id.as_str()),
        }
    }
}

impl fmt::Display for NodeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeSelector::Name(name) => write!(f, "name '{}'", name),
            NodeSelector::Id(id) => write!(f, "id '{}'", id),
        }
    }
}

pub fn node_name(node: &Value) -> Option<&str> {
    node.get("name").and_then(Value::as_str)
}

pub fn node_id(node: &Value) -> Option<&str> {
    node.get("id").and_then(Value::as_str)
}

/// A short label for messages: the node name, else its id, else its position.
pub fn node_label(node: &Value, position: usize) -> String {
    node_name(node)
        .or_else(|| node_id(node))
        .map(str::to_string)
        .unwrap_or_else(|| format!("#{}", position))
}

/// Positions of nodes keyed by `name` and by `id`.
///
/// Built from a snapshot of the node array. Rebuild it after any edit that
/// inserts nodes or changes names.
#[derive(Debug, Default)]
pub struct NodeIndex {
    by_name: AHashMap<String, Vec<usize>>,
    by_id: AHashMap<String, Vec<usize>>,
}

impl NodeIndex {
    pub fn build(nodes: &[Value]) -> Self {
        let mut index = Self::default();
        for (position, node) in nodes.iter().enumerate() {
            if let Some(name) = node_name(node) {
                index
                    .by_name
                    .entry(name.to_string())
                    .or_default()
                    .push(position);
            }
            if let Some(id) = node_id(node) {
                index.by_id.entry(id.to_string()).or_default().push(position);
            }
        }
        index
    }

    /// Positions of every node matching the selector, in document order.
    pub fn select(&self, selector: &NodeSelector) -> &[usize] {
        let found = match selector {
            NodeSelector::Name(name) => self.by_name.get(name),
            NodeSelector::Id(id) => self.by_id.get(id),
        };
        found.map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Names carried by more than one node, sorted.
    pub fn duplicate_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .by_name
            .iter()
            .filter(|(_, positions)| positions.len() > 1)
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}
