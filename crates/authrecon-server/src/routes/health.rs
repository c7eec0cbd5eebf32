//! Liveness route.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}

/// GET /health: profile name and registered type count.
async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "profile": state.profile.name,
        "types": state.profile.types.len(),
        "cachedResponses": state
            .dispatcher
            .engine()
            .client()
            .cache()
            .map(|c| c.len())
            .unwrap_or(0),
    }))
}
