use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A dot-separated path of object keys, relative to a node record.
///
/// `parameters.jsCode` addresses `node["parameters"]["jsCode"]`. Array indexing
/// is not supported; every segment must name an object key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    pub fn parse(path: &str) -> Result<Self, String> {
        if path.is_empty() {
            return Err("field path is empty".to_string());
        }
        let segments: Vec<String> = path.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(format!("field path '{}' has an empty segment", path));
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn get<'a>(&self, record: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(record, |current, key| current.as_object()?.get(key))
    }

    pub fn get_mut<'a>(&self, record: &'a mut Value) -> Option<&'a mut Value> {
        self.segments
            .iter()
            .try_fold(record, |current, key| current.as_object_mut()?.get_mut(key))
    }

    /// Sets the addressed field, creating missing intermediate objects.
    ///
    /// Returns the previous value, if any. On failure returns the first segment
    /// whose parent exists but is not an object.
    pub fn set(&self, record: &mut Value, value: Value) -> Result<Option<Value>, String> {
        let Some((last, parents)) = self.segments.split_last() else {
            return Err(String::new());
        };

        let mut current = record;
        for key in parents {
            let object = current.as_object_mut().ok_or_else(|| key.clone())?;
            current = object
                .entry(key.clone())
                .or_insert_with(|| Value::Object(Map::new()));
        }

        let object = current.as_object_mut().ok_or_else(|| last.clone())?;
        Ok(object.insert(last.clone(), value))
    }
}

impl TryFrom<String> for FieldPath {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.to_string()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}
