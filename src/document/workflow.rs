use super::node::{NodeIndex, NodeSelector};
use crate::error::DocumentError;
use serde_json::{Map, Value};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// An in-memory workflow document.
///
/// Only `nodes` and `connections` are interpreted. Every other key, and every
/// key inside a node record, is carried through untouched and in its original
/// order.
#[derive(Debug, Clone, PartialEq)]
pub struct Workflow {
    root: Map<String, Value>,
}

impl Workflow {
    /// Wraps a parsed JSON value. The value must be an object with a `nodes` array.
    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        let Value::Object(root) = value else {
            return Err(DocumentError::Malformed(
                "top-level value is not an object".to_string(),
            ));
        };
        match root.get("nodes") {
            Some(Value::Array(_)) => {}
            Some(_) => {
                return Err(DocumentError::Malformed(
                    "'nodes' is not an array".to_string(),
                ));
            }
            None => {
                return Err(DocumentError::Malformed(
                    "missing 'nodes' array".to_string(),
                ));
            }
        }
        if let Some(connections) = root.get("connections") {
            if !connections.is_object() {
                return Err(DocumentError::Malformed(
                    "'connections' is not an object".to_string(),
                ));
            }
        }
        Ok(Self { root })
    }

    /// Loads a workflow document from a UTF-8 JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| DocumentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let workflow = content.parse::<Workflow>()?;
        debug!(
            path = %path.display(),
            nodes = workflow.nodes().len(),
            "loaded workflow document"
        );
        Ok(workflow)
    }

    /// Serializes with two-space indentation. Non-ASCII text is written verbatim.
    pub fn to_json_string(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(&self.root)?)
    }

    /// Writes the document to `path`, replacing it atomically.
    ///
    /// The JSON is written to a temporary file next to the target and renamed
    /// over it, so a failed write leaves the previous contents in place.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let path = path.as_ref();
        let json = self.to_json_string()?;
        let write_err = |source: std::io::Error| DocumentError::Write {
            path: path.to_path_buf(),
            source,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(json.as_bytes()).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        if let Ok(metadata) = fs::metadata(path) {
            tmp.as_file()
                .set_permissions(metadata.permissions())
                .map_err(write_err)?;
        }
        tmp.persist(path).map_err(|e| write_err(e.error))?;

        info!(path = %path.display(), bytes = json.len(), "saved workflow document");
        Ok(())
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }

    pub fn nodes(&self) -> &[Value] {
        match self.root.get("nodes") {
            Some(Value::Array(nodes)) => nodes,
            _ => &[],
        }
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut Vec<Value> {
        let slot = self
            .root
            .entry("nodes")
            .or_insert_with(|| Value::Array(Vec::new()));
        if !slot.is_array() {
            *slot = Value::Array(Vec::new());
        }
        match slot {
            Value::Array(nodes) => nodes,
            _ => unreachable!("'nodes' was just ensured to be an array"),
        }
    }

    /// The `connections` object, if the document has one.
    pub fn connections(&self) -> Option<&Map<String, Value>> {
        self.root.get("connections").and_then(Value::as_object)
    }

    pub(crate) fn connections_mut(&mut self) -> &mut Map<String, Value> {
        let slot = self
            .root
            .entry("connections")
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        match slot {
            Value::Object(connections) => connections,
            _ => unreachable!("'connections' was just ensured to be an object"),
        }
    }

    pub fn index(&self) -> NodeIndex {
        NodeIndex::build(self.nodes())
    }

    /// The first node matching the selector.
    pub fn find_node(&self, selector: &NodeSelector) -> Option<&Value> {
        self.nodes().iter().find(|node| selector.matches(node))
    }
}

impl FromStr for Workflow {
    type Err = DocumentError;

    fn from_str(json: &str) -> Result<Self, Self::Err> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }
}
