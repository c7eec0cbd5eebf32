//! Reconciliation engine: fan out over a type's sources in order, score
//! each record, stop at the first confident match, then rank and truncate.

use std::collections::HashSet;
use std::sync::Arc;

use authrecon_core::{
    Candidate, Normalizer, RawRecord, Result, ServiceProfile, SourceDescriptor, TextNormalizer,
    TypeMeta,
};
use authrecon_sources::SourceClient;
use tracing::debug;

use crate::resolver::AuthorityResolver;
use crate::scorer::token_sort_ratio;

/// Candidates produced by one source, and whether later sources should be
/// skipped because a confident match was found.
#[derive(Debug, Clone, Default)]
struct SourceOutcome {
    candidates: Vec<Candidate>,
    stop: bool,
}

/// The query text in both raw and normalized form.
struct PreparedQuery<'a> {
    raw: &'a str,
    normalized: String,
}

pub struct ReconciliationEngine<C> {
    resolver: AuthorityResolver,
    client: C,
    normalizer: Arc<dyn Normalizer>,
    scan_cap: usize,
}

impl<C: SourceClient> ReconciliationEngine<C> {
    /// Create an engine over `profile` using the default text normalizer.
    pub fn new(profile: Arc<ServiceProfile>, client: C) -> Self {
        let scan_cap = profile.scan_cap;
        Self {
            resolver: AuthorityResolver::new(profile),
            client,
            normalizer: Arc::new(TextNormalizer),
            scan_cap,
        }
    }

    pub fn with_normalizer(mut self, normalizer: Arc<dyn Normalizer>) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_scan_cap(mut self, scan_cap: usize) -> Self {
        self.scan_cap = scan_cap;
        self
    }

    pub fn resolver(&self) -> &AuthorityResolver {
        &self.resolver
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Reconcile `query` against the sources registered for `type_id`.
    ///
    /// Returns at most `limit` candidates, unique by uri, ordered by score
    /// descending with ties kept in discovery order. Fails only with
    /// `UnknownType`; upstream failures contribute no candidates.
    pub async fn reconcile(
        &self,
        query: &str,
        type_id: &str,
        limit: usize,
    ) -> Result<Vec<Candidate>> {
        let sources = self.resolver.resolve(type_id)?;
        let prepared = PreparedQuery {
            raw: query,
            normalized: self.normalizer.normalize(query),
        };

        let mut seen = HashSet::new();
        let mut candidates = Vec::new();

        for source in sources {
            let outcome = self.scan_source(source, &prepared, &mut seen).await;
            candidates.extend(outcome.candidates);
            if outcome.stop {
                debug!("Confident match in {}; skipping remaining sources", source.id);
                break;
            }
        }

        // Stable: equal scores keep discovery order.
        candidates.sort_by(|a, b| b.score.cmp(&a.score));
        candidates.truncate(limit);

        debug!(
            "Reconciled {:?} as {}: {} candidates",
            query,
            type_id,
            candidates.len()
        );
        Ok(candidates)
    }

    /// Fetch one source and score its records, up to the scan cap. Records
    /// whose uri was already seen for this query are skipped.
    async fn scan_source(
        &self,
        source: &SourceDescriptor,
        query: &PreparedQuery<'_>,
        seen: &mut HashSet<String>,
    ) -> SourceOutcome {
        let records = self.client.fetch(source, &query.normalized).await;
        let mut outcome = SourceOutcome::default();

        for RawRecord { uri, label } in records.into_iter().take(self.scan_cap) {
            if !seen.insert(uri.clone()) {
                continue;
            }

            let (score, is_match) = self.evaluate(query, &label);
            outcome.candidates.push(Candidate {
                uri,
                label,
                score,
                is_match,
                type_meta: vec![TypeMeta::from(source)],
            });

            if is_match {
                outcome.stop = true;
                break;
            }
        }
        outcome
    }

    /// Best of the normalized-query and raw-query scores, plus the
    /// normalization-based match flag.
    fn evaluate(&self, query: &PreparedQuery<'_>, label: &str) -> (u32, bool) {
        let score = token_sort_ratio(&query.normalized, label)
            .max(token_sort_ratio(query.raw, label));
        let normalized_label = self.normalizer.normalize(label);
        let is_match = query.normalized == normalized_label || query.raw == normalized_label;
        (score, is_match)
    }
}
