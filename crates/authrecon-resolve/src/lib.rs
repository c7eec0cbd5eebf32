//! Reconciliation: resolve a type to its sources, fetch, score, dedupe, rank.

pub mod engine;
pub mod resolver;
pub mod scorer;

pub use engine::ReconciliationEngine;
pub use resolver::AuthorityResolver;
pub use scorer::token_sort_ratio;
