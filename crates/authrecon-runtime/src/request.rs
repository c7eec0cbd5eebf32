//! Parsing of inbound request parameters into [`Request`]s.

use authrecon_core::{Error, Result};
use serde_json::{Map, Value};

use crate::types::{BatchRequest, QuerySpec, Request};

/// Raw request parameters. The transport fills these from the form body
/// first, then the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    pub query: Option<String>,
    pub queries: Option<String>,
    pub type_id: Option<String>,
    pub limit: Option<String>,
}

impl RequestParams {
    /// `query` → single, `queries` → batch, neither → metadata.
    pub fn into_request(self) -> Result<Request> {
        if let Some(query) = self.query.filter(|q| !q.is_empty()) {
            let limit = parse_limit_param(self.limit.as_deref()).map_err(Error::MalformedQuery)?;
            let type_id = self.type_id.filter(|t| !t.is_empty());
            return parse_query(&query, type_id.as_deref(), limit).map(Request::Single);
        }

        if let Some(queries) = self.queries.filter(|q| !q.is_empty()) {
            let limit = parse_limit_param(self.limit.as_deref()).map_err(Error::MalformedBatch)?;
            return parse_batch(&queries, limit).map(Request::Batch);
        }

        Ok(Request::Metadata)
    }
}

fn parse_limit_param(raw: Option<&str>) -> std::result::Result<Option<usize>, String> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse()
            .map(Some)
            .map_err(|_| format!("invalid limit '{}'", s)),
    }
}

/// Read a limit given as a JSON integer or numeric string. `null` means
/// no limit was supplied.
pub fn parse_limit(value: &Value) -> std::result::Result<Option<usize>, String> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| format!("invalid limit {}", n)),
        Value::String(s) => parse_limit_param(Some(s.as_str())),
        other => Err(format!("invalid limit {}", other)),
    }
}

/// Parse a single `query` parameter: either plain text or a JSON object
/// `{query, type?, limit?}`. Object fields win over the request-level
/// `type` and `limit`.
pub fn parse_query(raw: &str, type_id: Option<&str>, limit: Option<usize>) -> Result<QuerySpec> {
    if !raw.trim_start().starts_with('{') {
        return Ok(QuerySpec {
            text: raw.to_string(),
            type_id: type_id.map(str::to_string),
            limit,
        });
    }

    let value: Value =
        serde_json::from_str(raw).map_err(|e| Error::MalformedQuery(e.to_string()))?;
    let object = value
        .as_object()
        .ok_or_else(|| Error::MalformedQuery("expected a JSON object".into()))?;
    let mut spec = query_from_object(object).map_err(Error::MalformedQuery)?;
    if spec.type_id.is_none() {
        spec.type_id = type_id.map(str::to_string);
    }
    if spec.limit.is_none() {
        spec.limit = limit;
    }
    Ok(spec)
}

/// Parse a `queries` parameter: a JSON object of key → `{query, type?, limit?}`.
pub fn parse_batch(raw: &str, limit: Option<usize>) -> Result<BatchRequest> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| Error::MalformedBatch(e.to_string()))?;
    let entries = value
        .as_object()
        .ok_or_else(|| Error::MalformedBatch("expected a JSON object of queries".into()))?;

    let mut queries = Vec::with_capacity(entries.len());
    for (key, entry) in entries {
        let object = entry
            .as_object()
            .ok_or_else(|| Error::MalformedBatch(format!("query '{}' is not an object", key)))?;
        let spec = query_from_object(object)
            .map_err(|e| Error::MalformedBatch(format!("query '{}': {}", key, e)))?;
        queries.push((key.clone(), spec));
    }

    Ok(BatchRequest { queries, limit })
}

fn query_from_object(object: &Map<String, Value>) -> std::result::Result<QuerySpec, String> {
    let text = object
        .get("query")
        .and_then(Value::as_str)
        .ok_or_else(|| "missing string field 'query'".to_string())?;

    let type_id = match object.get("type") {
        None | Some(Value::Null) => None,
        Some(Value::String(t)) if t.is_empty() => None,
        Some(Value::String(t)) => Some(t.clone()),
        Some(other) => return Err(format!("invalid type {}", other)),
    };

    let limit = match object.get("limit") {
        None => None,
        Some(v) => parse_limit(v)?,
    };

    Ok(QuerySpec {
        text: text.to_string(),
        type_id,
        limit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_no_params_is_metadata() {
        assert_eq!(
            RequestParams::default().into_request().unwrap(),
            Request::Metadata
        );
    }

    #[test]
    fn test_plain_single_query() {
        let params = RequestParams {
            query: Some("Santa Cruz".into()),
            type_id: Some("names".into()),
            limit: Some("5".into()),
            ..Default::default()
        };
        assert_eq!(
            params.into_request().unwrap(),
            Request::Single(QuerySpec::new("Santa Cruz").with_type("names").with_limit(5))
        );
    }

    #[test]
    fn test_json_single_query_overrides_params() {
        let spec = parse_query(
            r#"{"query": "Seattle", "type": "places", "limit": "2"}"#,
            Some("names"),
            Some(9),
        )
        .unwrap();
        assert_eq!(spec, QuerySpec::new("Seattle").with_type("places").with_limit(2));

        let spec = parse_query(r#"{"query": "Seattle"}"#, Some("names"), Some(9)).unwrap();
        assert_eq!(spec, QuerySpec::new("Seattle").with_type("names").with_limit(9));
    }

    #[test]
    fn test_malformed_single_query() {
        let err = parse_query("{not json", None, None).unwrap_err();
        assert!(matches!(err, Error::MalformedQuery(_)));

        let params = RequestParams {
            query: Some("x".into()),
            limit: Some("many".into()),
            ..Default::default()
        };
        assert!(matches!(params.into_request(), Err(Error::MalformedQuery(_))));
    }

    #[test]
    fn test_batch() {
        let raw = json!({
            "q0": {"query": "Santa Cruz", "type": "places", "limit": 1},
            "q1": {"query": "Wisconsin", "type": "places"},
            "q2": {"query": "Arkansas", "limit": "4"},
        })
        .to_string();
        let batch = parse_batch(&raw, Some(7)).unwrap();
        assert_eq!(batch.limit, Some(7));
        assert_eq!(
            batch.queries,
            vec![
                (
                    "q0".to_string(),
                    QuerySpec::new("Santa Cruz").with_type("places").with_limit(1)
                ),
                ("q1".to_string(), QuerySpec::new("Wisconsin").with_type("places")),
                ("q2".to_string(), QuerySpec::new("Arkansas").with_limit(4)),
            ]
        );
    }

    #[test]
    fn test_malformed_batches() {
        for raw in [
            "not json",
            "[1, 2]",
            r#"{"q0": "Santa Cruz"}"#,
            r#"{"q0": {"type": "names"}}"#,
            r#"{"q0": {"query": "x", "limit": -1}}"#,
            r#"{"q0": {"query": "x", "limit": "lots"}}"#,
            r#"{"q0": {"query": "x", "type": 3}}"#,
        ] {
            let err = parse_batch(raw, None).unwrap_err();
            assert!(matches!(err, Error::MalformedBatch(_)), "accepted {}", raw);
        }
    }

    #[test]
    fn test_batch_level_limit_must_be_numeric() {
        let params = RequestParams {
            queries: Some(r#"{"q0": {"query": "x", "type": "names"}}"#.into()),
            limit: Some("-3".into()),
            ..Default::default()
        };
        assert!(matches!(params.into_request(), Err(Error::MalformedBatch(_))));
    }

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit(&json!(null)), Ok(None));
        assert_eq!(parse_limit(&json!(0)), Ok(Some(0)));
        assert_eq!(parse_limit(&json!(" 12 ")), Ok(Some(12)));
        assert!(parse_limit(&json!(1.5)).is_err());
        assert!(parse_limit(&json!(true)).is_err());
    }
}
