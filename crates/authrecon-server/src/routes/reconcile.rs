//! Reconciliation endpoint: metadata, single queries and keyed batches on
//! one path, with optional JSONP wrapping.

use std::collections::HashMap;
use std::sync::Arc;

use authrecon_runtime::{RequestParams, Response as Outcome};
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::state::AppState;

const MAX_CALLBACK_LEN: usize = 128;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(reconcile).post(reconcile))
}

/// GET|POST /: `query`, `queries`, or neither for service metadata.
async fn reconcile(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    let mut params = collect_params(query, &body);

    let callback = params.remove("callback").filter(|c| !c.is_empty());
    if let Some(cb) = &callback {
        if !is_valid_callback(cb) {
            debug!("Rejecting callback {:?}", cb);
            return render(
                StatusCode::BAD_REQUEST,
                json!({ "error": "invalid callback name" }),
                None,
            );
        }
    }

    let request = RequestParams {
        query: params.remove("query"),
        queries: params.remove("queries"),
        type_id: params.remove("type"),
        limit: params.remove("limit"),
    };

    let (status, body) = match request.into_request() {
        Ok(request) => outcome_body(state.dispatcher.dispatch(request).await),
        Err(e) if e.is_client_error() => {
            debug!("Bad reconcile request: {}", e);
            (StatusCode::BAD_REQUEST, json!({ "error": e.to_string() }))
        }
        Err(e) => {
            warn!("Reconcile request failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": e.to_string() }),
            )
        }
    };

    render(status, body, callback.as_deref())
}

/// Merge query string and form body parameters. Form values win.
pub fn collect_params(query: HashMap<String, String>, body: &[u8]) -> HashMap<String, String> {
    let mut params = query;
    for (key, value) in url::form_urlencoded::parse(body) {
        params.insert(key.into_owned(), value.into_owned());
    }
    params
}

/// JavaScript identifier characters plus `.`, not starting with a digit.
pub fn is_valid_callback(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_CALLBACK_LEN
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.'))
}

fn outcome_body(outcome: Outcome) -> (StatusCode, Value) {
    match outcome {
        Outcome::Single(candidates) => (StatusCode::OK, json!({ "result": candidates })),
        Outcome::Batch(results) => (StatusCode::OK, json!(results)),
        Outcome::Metadata(metadata) => (StatusCode::OK, json!(metadata)),
        Outcome::Error(kind) => (
            StatusCode::BAD_REQUEST,
            json!({ "error": kind.to_string() }),
        ),
    }
}

fn render(status: StatusCode, body: Value, callback: Option<&str>) -> Response {
    match callback {
        Some(cb) => (
            status,
            [(header::CONTENT_TYPE, "text/javascript")],
            format!("{}({})", cb, body),
        )
            .into_response(),
        None => (status, Json(body)).into_response(),
    }
}
