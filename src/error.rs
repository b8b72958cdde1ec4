use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or saving a workflow document.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Could not read workflow document '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Could not write workflow document '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse workflow JSON: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("Workflow document is malformed: {0}")]
    Malformed(String),
}

/// Errors that can occur while loading a patch definition.
#[derive(Error, Debug)]
pub enum DefinitionError {
    #[error("Could not read patch definition '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse patch TOML: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("Failed to parse patch JSON: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("Unsupported patch file extension for '{0}' (expected .toml or .json)")]
    UnsupportedFormat(PathBuf),

    #[error("Patch '{patch}' is invalid: {message}")]
    Invalid { patch: String, message: String },
}

/// Errors that can occur while applying a patch to a document.
///
/// A selector that matches nothing, or a literal that is not found, is not an
/// error. Those degrade to a reported no-op.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PatchError {
    #[error("Field '{field}' not found on node '{node}'")]
    FieldNotFound { node: String, field: String },

    #[error("Field '{field}' on node '{node}' is not a string")]
    FieldNotText { node: String, field: String },

    #[error("Cannot set '{field}' on node '{node}': '{segment}' is not an object")]
    PathBlocked {
        node: String,
        field: String,
        segment: String,
    },

    #[error("Selector {selector} matches {count} nodes; renaming requires exactly one")]
    AmbiguousRename { selector: String, count: usize },

    #[error("Node record for step {step} must be a JSON object")]
    InvalidNodeRecord { step: usize },

    #[error("Cannot rename node '{from}' to '{to}': a node with that name already exists")]
    NameTaken { from: String, to: String },

    #[error("Cannot rename node '{from}' to '{to}': connections already has an entry for '{to}'")]
    ConnectionTaken { from: String, to: String },
}

/// Any failure surfaced by a full load -> apply -> save run.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error("Patch '{patch}' failed: {source}")]
    Patch { patch: String, source: PatchError },
}
