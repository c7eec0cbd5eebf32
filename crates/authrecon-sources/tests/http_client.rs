//! HttpSourceClient against a local stub upstream.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use authrecon_core::{RawRecord, ResponseFormat, SourceDescriptor};
use authrecon_sources::{FetchError, HttpSourceClient, ResponseCache, SourceClient};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

async fn spawn_upstream(hits: Arc<AtomicUsize>) -> String {
    let app = Router::new()
        .route(
            "/qa/local/names",
            get(
                |State(hits): State<Arc<AtomicUsize>>,
                 Query(params): Query<HashMap<String, String>>| async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    let q = params.get("q").cloned().unwrap_or_default();
                    Json(json!([
                        {"id": "local:1", "label": format!("{} (local)", q)},
                        {"id": "local:2", "label": "Something else"},
                    ]))
                },
            ),
        )
        .route(
            "/qa/broken/names",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .route("/qa/garbage/names", get(|| async { "<html>not json</html>" }))
        .route(
            "/qa/slow/names",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Json(json!([]))
            }),
        )
        .route(
            "/loc/search/",
            get(|| async {
                json!([
                    "atom:feed",
                    [
                        "atom:entry",
                        ["atom:title", {}, "Rivers"],
                        [
                            "atom:link",
                            {"href": "http://id.loc.gov/authorities/subjects/sh85114461.html"}
                        ],
                        ["atom:id", {}, "info:lc/authorities/sh85114461"]
                    ]
                ])
                .to_string()
            }),
        )
        .with_state(hits);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn qa_source(base: &str, authority: &str) -> SourceDescriptor {
    SourceDescriptor {
        id: format!("{}Names", authority),
        authority_id: authority.into(),
        subauthority_id: "names".into(),
        display_name: format!("{} names", authority),
        endpoint_template: format!("{}/qa/{{authority}}/{{subauthority}}?q={{query}}", base),
        format: ResponseFormat::Flat,
    }
}

#[tokio::test]
async fn test_flat_fetch() {
    let base = spawn_upstream(Arc::new(AtomicUsize::new(0))).await;
    let client = HttpSourceClient::new(Duration::from_secs(5)).unwrap();

    let records = client.fetch(&qa_source(&base, "local"), "santa cruz").await;
    assert_eq!(
        records,
        vec![
            RawRecord::new("local:1", "santa cruz (local)"),
            RawRecord::new("local:2", "Something else"),
        ]
    );
}

#[tokio::test]
async fn test_nested_fetch() {
    let base = spawn_upstream(Arc::new(AtomicUsize::new(0))).await;
    let client = HttpSourceClient::new(Duration::from_secs(5)).unwrap();
    let source = SourceDescriptor {
        id: "subjects".into(),
        authority_id: "loc".into(),
        subauthority_id: "subjects".into(),
        display_name: "Subject Headings".into(),
        endpoint_template: format!("{}/loc/search/?format=json&q={{query}}", base),
        format: ResponseFormat::NestedTuple,
    };

    let records = client.try_fetch(&source, "rivers").await.unwrap();
    assert_eq!(
        records,
        vec![RawRecord::new(
            "http://id.loc.gov/authorities/subjects/sh85114461",
            "Rivers"
        )]
    );
}

#[tokio::test]
async fn test_status_error_is_recovered() {
    let base = spawn_upstream(Arc::new(AtomicUsize::new(0))).await;
    let client = HttpSourceClient::new(Duration::from_secs(5)).unwrap();
    let source = qa_source(&base, "broken");

    let err = client.try_fetch(&source, "x").await.unwrap_err();
    assert!(matches!(err, FetchError::Status(500)));
    assert!(client.fetch(&source, "x").await.is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_recovered() {
    let base = spawn_upstream(Arc::new(AtomicUsize::new(0))).await;
    let client = HttpSourceClient::new(Duration::from_secs(5)).unwrap();
    let source = qa_source(&base, "garbage");

    let err = client.try_fetch(&source, "x").await.unwrap_err();
    assert!(matches!(err, FetchError::Malformed(_)));
    assert!(client.fetch(&source, "x").await.is_empty());
}

#[tokio::test]
async fn test_timeout_is_recovered() {
    let base = spawn_upstream(Arc::new(AtomicUsize::new(0))).await;
    let client = HttpSourceClient::new(Duration::from_millis(200)).unwrap();
    let source = qa_source(&base, "slow");

    let err = client.try_fetch(&source, "x").await.unwrap_err();
    assert!(matches!(err, FetchError::Timeout(_)));
}

#[tokio::test]
async fn test_unreachable_upstream_is_recovered() {
    let client = HttpSourceClient::new(Duration::from_secs(2)).unwrap();
    // Bind then drop to get a port nothing listens on.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let source = qa_source(&format!("http://127.0.0.1:{}", port), "local");
    assert!(client.fetch(&source, "x").await.is_empty());
}

#[tokio::test]
async fn test_cache_serves_repeat_urls() {
    let hits = Arc::new(AtomicUsize::new(0));
    let base = spawn_upstream(hits.clone()).await;
    let cache = Arc::new(ResponseCache::new(10, Duration::from_secs(60)));
    let client = HttpSourceClient::new(Duration::from_secs(5))
        .unwrap()
        .with_cache(cache.clone());
    let source = qa_source(&base, "local");

    let first = client.fetch(&source, "santa cruz").await;
    let second = client.fetch(&source, "santa cruz").await;
    assert_eq!(first, second);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(cache.len(), 1);

    client.fetch(&source, "seattle").await;
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failed_responses_are_not_cached() {
    let base = spawn_upstream(Arc::new(AtomicUsize::new(0))).await;
    let cache = Arc::new(ResponseCache::new(10, Duration::from_secs(60)));
    let client = HttpSourceClient::new(Duration::from_secs(5))
        .unwrap()
        .with_cache(cache.clone());

    client.fetch(&qa_source(&base, "broken"), "x").await;
    assert!(cache.is_empty());
}
