//! Source clients: one lookup against one upstream authority endpoint.
//!
//! Upstream failures never escape [`SourceClient::fetch`]: they are logged
//! and turned into an empty record list so a fallback chain can move on.

pub mod cache;
pub mod client;
pub mod error;
pub mod memory;
pub mod parse;

pub use cache::ResponseCache;
pub use client::{build_url, HttpSourceClient, SourceClient};
pub use error::FetchError;
pub use memory::StaticSourceClient;
