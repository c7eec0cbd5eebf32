//! In-memory source client serving fixed records per source id.

use std::collections::HashMap;

use authrecon_core::{RawRecord, SourceDescriptor};
use parking_lot::Mutex;

use crate::client::SourceClient;
use crate::error::FetchError;

enum Fixture {
    Records(Vec<RawRecord>),
    Failure(String),
}

/// Serves canned responses keyed by source id and records every call.
/// Sources without a fixture return no records.
#[derive(Default)]
pub struct StaticSourceClient {
    fixtures: HashMap<String, Fixture>,
    calls: Mutex<Vec<(String, String)>>,
}

impl StaticSourceClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(mut self, source_id: &str, records: Vec<RawRecord>) -> Self {
        self.fixtures
            .insert(source_id.to_string(), Fixture::Records(records));
        self
    }

    /// Make `source_id` fail as an unreachable upstream would.
    pub fn with_failure(mut self, source_id: &str, message: &str) -> Self {
        self.fixtures
            .insert(source_id.to_string(), Fixture::Failure(message.to_string()));
        self
    }

    /// `(source id, query)` pairs in call order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().clone()
    }

    /// Source ids fetched, in call order.
    pub fn fetched_sources(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(id, _)| id.clone()).collect()
    }
}

impl SourceClient for StaticSourceClient {
    async fn try_fetch(
        &self,
        source: &SourceDescriptor,
        query: &str,
    ) -> Result<Vec<RawRecord>, FetchError> {
        self.calls
            .lock()
            .push((source.id.clone(), query.to_string()));
        match self.fixtures.get(&source.id) {
            Some(Fixture::Records(records)) => Ok(records.clone()),
            Some(Fixture::Failure(message)) => Err(FetchError::Malformed(message.clone())),
            None => Ok(Vec::new()),
        }
    }
}
