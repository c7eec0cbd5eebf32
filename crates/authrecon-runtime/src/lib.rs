//! Runtime dispatcher: turns parsed requests into reconciliation runs.
//!
//! Single queries, keyed batches and metadata requests all enter through
//! [`Dispatcher::dispatch`]. Batch keys run concurrently up to a cap.

pub mod dispatcher;
pub mod request;
pub mod types;

pub use dispatcher::{resolve_limit, Dispatcher};
pub use request::{parse_batch, parse_limit, parse_query, RequestParams};
pub use types::*;
