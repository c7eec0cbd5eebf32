//! AuthRecon server: HTTP surface over the reconciliation dispatcher.

pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
