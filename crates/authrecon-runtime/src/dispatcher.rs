//! Dispatcher: routes single, batch and metadata requests to the engine.

use std::collections::BTreeMap;

use authrecon_core::{Error, ServiceMetadata};
use authrecon_resolve::ReconciliationEngine;
use authrecon_sources::SourceClient;
use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::types::*;

/// Effective limit: the query's own, else the batch's, else [`DEFAULT_LIMIT`].
pub fn resolve_limit(query: Option<usize>, batch: Option<usize>) -> usize {
    query.or(batch).unwrap_or(DEFAULT_LIMIT)
}

pub struct Dispatcher<C> {
    engine: ReconciliationEngine<C>,
    max_concurrency: usize,
}

impl<C: SourceClient> Dispatcher<C> {
    /// `max_concurrency` bounds how many batch keys reconcile at once.
    pub fn new(engine: ReconciliationEngine<C>, max_concurrency: usize) -> Self {
        Self {
            engine,
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub fn engine(&self) -> &ReconciliationEngine<C> {
        &self.engine
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub fn metadata(&self) -> ServiceMetadata {
        self.engine.resolver().metadata()
    }

    pub async fn dispatch(&self, request: Request) -> Response {
        match request {
            Request::Metadata => Response::Metadata(self.metadata()),
            Request::Single(spec) => self.dispatch_single(&spec).await.into(),
            Request::Batch(batch) => self.dispatch_batch(batch).await,
        }
    }

    /// Run one query. A query without a type falls back to the profile's
    /// default type, and to metadata when there is none.
    pub async fn dispatch_single(&self, spec: &QuerySpec) -> QueryOutcome {
        let default_type = self.engine.resolver().profile().default_type.as_deref();
        let Some(type_id) = spec.type_id.as_deref().or(default_type) else {
            return QueryOutcome::Metadata(self.metadata());
        };

        let limit = resolve_limit(spec.limit, None);
        match self.engine.reconcile(&spec.text, type_id, limit).await {
            Ok(candidates) => QueryOutcome::Results(candidates),
            Err(Error::UnknownType(t)) => QueryOutcome::Error(QueryErrorKind::UnknownType(t)),
            Err(e) => {
                // reconcile only fails on resolution
                warn!("Unexpected reconcile failure for {:?}: {}", spec.text, e);
                QueryOutcome::Results(Vec::new())
            }
        }
    }

    /// Run every key of a batch, at most `max_concurrency` at a time. One
    /// key's unknown type does not affect its siblings. If any key lacks a
    /// type the whole batch answers with metadata.
    pub async fn dispatch_batch(&self, batch: BatchRequest) -> Response {
        if batch.queries.iter().any(|(_, spec)| spec.type_id.is_none()) {
            debug!("Batch has an untyped query; returning metadata");
            return Response::Metadata(self.metadata());
        }

        let batch_limit = batch.limit;
        let results: BTreeMap<String, KeyResult> = stream::iter(batch.queries)
            .map(|(key, spec)| self.run_key(key, spec, batch_limit))
            .buffer_unordered(self.max_concurrency)
            .collect()
            .await;

        Response::Batch(results)
    }

    async fn run_key(
        &self,
        key: String,
        spec: QuerySpec,
        batch_limit: Option<usize>,
    ) -> (String, KeyResult) {
        let type_id = spec.type_id.as_deref().unwrap_or_default();
        let limit = resolve_limit(spec.limit, batch_limit);

        let result = match self.engine.reconcile(&spec.text, type_id, limit).await {
            Ok(candidates) => KeyResult::ok(candidates),
            Err(Error::UnknownType(t)) => {
                warn!("Batch key {}: unknown type {}", key, t);
                KeyResult::failed(&QueryErrorKind::UnknownType(t))
            }
            Err(e) => {
                warn!("Batch key {}: {}", key, e);
                KeyResult::ok(Vec::new())
            }
        };
        (key, result)
    }
}
