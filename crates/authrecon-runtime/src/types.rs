//! Dispatcher request and response types.

use std::collections::BTreeMap;

use authrecon_core::{Candidate, ServiceMetadata};
use serde::Serialize;

/// Limit used when neither the query nor the batch supplies one.
pub const DEFAULT_LIMIT: usize = 3;

/// One query as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    pub text: String,
    pub type_id: Option<String>,
    pub limit: Option<usize>,
}

impl QuerySpec {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            type_id: None,
            limit: None,
        }
    }

    pub fn with_type(mut self, type_id: impl Into<String>) -> Self {
        self.type_id = Some(type_id.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Caller-keyed queries plus the batch-level limit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchRequest {
    pub queries: Vec<(String, QuerySpec)>,
    pub limit: Option<usize>,
}

/// A parsed inbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Metadata,
    Single(QuerySpec),
    Batch(BatchRequest),
}

/// Why a single query produced no result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryErrorKind {
    UnknownType(String),
}

impl std::fmt::Display for QueryErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryErrorKind::UnknownType(t) => write!(f, "unknown type: {}", t),
        }
    }
}

/// Outcome of one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    Results(Vec<Candidate>),
    Metadata(ServiceMetadata),
    Error(QueryErrorKind),
}

/// `{result: [...]}`, with `error` set when the key's type was unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyResult {
    pub result: Vec<Candidate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl KeyResult {
    pub fn ok(result: Vec<Candidate>) -> Self {
        Self {
            result,
            error: None,
        }
    }

    pub fn failed(kind: &QueryErrorKind) -> Self {
        Self {
            result: Vec::new(),
            error: Some(kind.to_string()),
        }
    }
}

/// Outcome of a whole call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Single(Vec<Candidate>),
    Batch(BTreeMap<String, KeyResult>),
    Metadata(ServiceMetadata),
    Error(QueryErrorKind),
}

impl From<QueryOutcome> for Response {
    fn from(outcome: QueryOutcome) -> Self {
        match outcome {
            QueryOutcome::Results(candidates) => Response::Single(candidates),
            QueryOutcome::Metadata(meta) => Response::Metadata(meta),
            QueryOutcome::Error(kind) => Response::Error(kind),
        }
    }
}
