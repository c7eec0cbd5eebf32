//! Records and candidates exchanged between the source client and the engine.

use serde::{Deserialize, Serialize};

use crate::profile::SourceDescriptor;

/// One record as parsed out of an upstream response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub uri: String,
    pub label: String,
}

impl RawRecord {
    pub fn new(uri: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            label: label.into(),
        }
    }
}

/// `{id, name}` pair describing the source a candidate was attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeMeta {
    pub id: String,
    pub name: String,
}

impl From<&SourceDescriptor> for TypeMeta {
    fn from(source: &SourceDescriptor) -> Self {
        Self {
            id: source.id.clone(),
            name: source.display_name.clone(),
        }
    }
}

/// A scored reconciliation candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(rename = "id")]
    pub uri: String,
    #[serde(rename = "name")]
    pub label: String,
    /// Similarity in `0..=100`.
    pub score: u32,
    /// Normalized label equals the normalized (or raw) query.
    #[serde(rename = "match")]
    pub is_match: bool,
    #[serde(rename = "type")]
    pub type_meta: Vec<TypeMeta>,
}
