use crate::document::{FieldPath, NodeSelector};
use crate::error::DefinitionError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// One literal substitution: every occurrence of `find` becomes `replace`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Replacement {
    pub find: String,
    pub replace: String,
}

impl Replacement {
    pub fn new(find: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            find: find.into(),
            replace: replace.into(),
        }
    }
}

/// A single edit within a patch.
///
/// Node-level steps carry a `node` selector and edit every node it matches.
/// Document-level steps edit the node array or the `connections` map directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case", deny_unknown_fields)]
pub enum Step {
    /// Literal find/replace inside a string field. Either `find` + `replace`
    /// or a `replacements` list (or both; the single pair runs first).
    ReplaceText {
        node: NodeSelector,
        field: FieldPath,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        find: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        replace: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        replacements: Vec<Replacement>,
    },
    /// Removes whitespace-only lines from a string field.
    StripBlankLines { node: NodeSelector, field: FieldPath },
    /// Sets a field to a JSON value, creating intermediate objects.
    SetField {
        node: NodeSelector,
        field: FieldPath,
        value: Value,
    },
    /// Swaps the whole node record, carrying over the `keep` fields.
    ReplaceNode {
        node: NodeSelector,
        record: Value,
        #[serde(default = "default_keep")]
        keep: Vec<FieldPath>,
    },
    /// Renames a node and rewires every connection that referred to it.
    RenameNode { node: NodeSelector, to: String },
    /// Inserts a node record at `index`, or appends it.
    InsertNode {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
        record: Value,
    },
    /// Sets the routing for the connection keyed by node name `from`.
    SetConnection { from: String, routing: Value },
    /// Deletes the connection keyed by node name `from`.
    RemoveConnection { from: String },
}

fn default_keep() -> Vec<FieldPath> {
    FieldPath::parse("position").into_iter().collect()
}

impl Step {
    /// A `replace_text` step with a single literal pair.
    pub fn replace_text(
        node: NodeSelector,
        field: FieldPath,
        find: impl Into<String>,
        replace: impl Into<String>,
    ) -> Self {
        Step::ReplaceText {
            node,
            field,
            find: Some(find.into()),
            replace: Some(replace.into()),
            replacements: Vec::new(),
        }
    }

    /// The `op` tag used in patch files.
    pub fn op_name(&self) -> &'static str {
        match self {
            Step::ReplaceText { .. } => "replace_text",
            Step::StripBlankLines { .. } => "strip_blank_lines",
            Step::SetField { .. } => "set_field",
            Step::ReplaceNode { .. } => "replace_node",
            Step::RenameNode { .. } => "rename_node",
            Step::InsertNode { .. } => "insert_node",
            Step::SetConnection { .. } => "set_connection",
            Step::RemoveConnection { .. } => "remove_connection",
        }
    }

    pub fn selector(&self) -> Option<&NodeSelector> {
        match self {
            Step::ReplaceText { node, .. }
            | Step::StripBlankLines { node, .. }
            | Step::SetField { node, .. }
            | Step::ReplaceNode { node, .. }
            | Step::RenameNode { node, .. } => Some(node),
            Step::InsertNode { .. }
            | Step::SetConnection { .. }
            | Step::RemoveConnection { .. } => None,
        }
    }

    /// Literal pairs of a `replace_text` step, in application order.
    pub fn replacement_pairs(&self) -> Vec<Replacement> {
        match self {
            Step::ReplaceText {
                find,
                replace,
                replacements,
                ..
            } => {
                let single = match (find, replace) {
                    (Some(find), Some(replace)) => Some(Replacement::new(find, replace)),
                    _ => None,
                };
                single
                    .into_iter()
                    .chain(replacements.iter().cloned())
                    .collect()
            }
            _ => Vec::new(),
        }
    }

    fn validate(&self) -> Result<(), String> {
        match self {
            Step::ReplaceText { find, replace, .. } => {
                if find.is_some() != replace.is_some() {
                    return Err("'find' and 'replace' must be given together".to_string());
                }
                let pairs = self.replacement_pairs();
                if pairs.is_empty() {
                    return Err("no literal pairs given".to_string());
                }
                for pair in &pairs {
                    if pair.find.is_empty() {
                        return Err("'find' literal is empty".to_string());
                    }
                    if pair.find == pair.replace {
                        return Err(format!(
                            "'find' and 'replace' are identical ('{}')",
                            crate::patch::text::preview(&pair.find)
                        ));
                    }
                }
                Ok(())
            }
            Step::ReplaceNode { record, .. } | Step::InsertNode { record, .. } => {
                if record.is_object() {
                    Ok(())
                } else {
                    Err("'record' must be a table/object".to_string())
                }
            }
            Step::RenameNode { to, .. } => {
                if to.is_empty() {
                    Err("'to' is empty".to_string())
                } else {
                    Ok(())
                }
            }
            Step::SetConnection { from, .. } | Step::RemoveConnection { from } => {
                if from.is_empty() {
                    Err("'from' is empty".to_string())
                } else {
                    Ok(())
                }
            }
            Step::StripBlankLines { .. } | Step::SetField { .. } => Ok(()),
        }
    }
}

/// A named, ordered list of steps against one workflow document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatchDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Document to patch. Relative paths resolve against the run root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<PathBuf>,
    /// Status lines printed after the patch has been applied.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    pub steps: Vec<Step>,
}

impl PatchDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            target: None,
            notes: Vec::new(),
            steps: Vec::new(),
        }
    }

    pub fn with_target(mut self, target: impl Into<PathBuf>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Loads a patch from a `.toml` or `.json` file and validates it.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DefinitionError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| DefinitionError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            _ => Err(DefinitionError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, DefinitionError> {
        let definition: Self = toml::from_str(content)?;
        definition.validate()?;
        Ok(definition)
    }

    pub fn from_json_str(content: &str) -> Result<Self, DefinitionError> {
        let definition: Self = serde_json::from_str(content)?;
        definition.validate()?;
        Ok(definition)
    }

    /// Checks the invariants serde cannot express.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        let invalid = |message: String| DefinitionError::Invalid {
            patch: self.name.clone(),
            message,
        };
        if self.name.trim().is_empty() {
            return Err(invalid("name is empty".to_string()));
        }
        if self.steps.is_empty() {
            return Err(invalid("no steps defined".to_string()));
        }
        for (i, step) in self.steps.iter().enumerate() {
            step.validate().map_err(|message| {
                invalid(format!("step {} ({}): {}", i + 1, step.op_name(), message))
            })?;
        }
        Ok(())
    }

    /// Resolves the target path against `root`. Absolute targets are kept as-is.
    pub fn resolve_target(&self, root: &Path) -> Option<PathBuf> {
        self.target.as_ref().map(|target| {
            if target.is_absolute() {
                target.clone()
            } else {
                root.join(target)
            }
        })
    }
}
