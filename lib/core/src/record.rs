use crate::vector::FeatureVector;
use serde::{Deserialize, Serialize};

/// A shaped entity: identifier, display name and feature vector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    pub vector: FeatureVector,
    /// Remaining raw columns, passed through untouched for consumers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    String(String),
    Integer(u64),
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordId::String(s) => write!(f, "{}", s),
            RecordId::Integer(i) => write!(f, "{}", i),
        }
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        RecordId::String(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::String(s.to_string())
    }
}

impl From<u64> for RecordId {
    fn from(i: u64) -> Self {
        RecordId::Integer(i)
    }
}

impl Record {
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<RecordId>, name: impl Into<String>, vector: FeatureVector) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            vector,
            attributes: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_attributes(mut self, attributes: serde_json::Value) -> Self {
        self.attributes = Some(attributes);
        self
    }
}
