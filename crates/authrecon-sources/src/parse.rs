//! Response parsers, selected per source by [`ResponseFormat`].

use authrecon_core::{RawRecord, ResponseFormat};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::FetchError;

/// Parse an upstream body into records using the source's declared format.
pub fn parse_body(format: ResponseFormat, body: &str) -> Result<Vec<RawRecord>, FetchError> {
    let value: Value = serde_json::from_str(strip_jsonp(body))?;
    match format {
        ResponseFormat::Flat => parse_flat(&value),
        ResponseFormat::NestedTuple => parse_nested(&value),
    }
}

/// Some upstreams wrap JSON as `(...);`.
fn strip_jsonp(body: &str) -> &str {
    body.trim()
        .trim_start_matches('(')
        .trim_end_matches(&[')', ';'][..])
}

#[derive(Deserialize)]
struct FlatItem {
    id: String,
    label: String,
}

/// `[{"id": "...", "label": "..."}, ...]`. Items without a string id and
/// label are skipped.
pub fn parse_flat(value: &Value) -> Result<Vec<RawRecord>, FetchError> {
    let items = value
        .as_array()
        .ok_or_else(|| FetchError::Malformed("expected a JSON array".into()))?;

    let mut records = Vec::with_capacity(items.len());
    for item in items {
        match FlatItem::deserialize(item) {
            Ok(FlatItem { id, label }) => records.push(RawRecord::new(id, label)),
            Err(e) => debug!("Skipping flat item: {}", e),
        }
    }
    Ok(records)
}

/// Atom-style tagged tuples. Each element headed by `"atom:entry"` holds
/// `[tag, attrs, text]` sub-arrays; `atom:title` gives the label and
/// `atom:link` (attribute `href`) the uri, minus its file extension.
/// Entries missing either are skipped.
pub fn parse_nested(value: &Value) -> Result<Vec<RawRecord>, FetchError> {
    let items = value
        .as_array()
        .ok_or_else(|| FetchError::Malformed("expected a JSON array".into()))?;

    let records = items
        .iter()
        .filter_map(Value::as_array)
        .filter(|item| item.first().and_then(Value::as_str) == Some("atom:entry"))
        .filter_map(|item| parse_entry(item))
        .collect();
    Ok(records)
}

fn parse_entry(item: &[Value]) -> Option<RawRecord> {
    let mut title = None;
    let mut link = None;

    for field in item.iter().filter_map(Value::as_array) {
        match field.first().and_then(Value::as_str) {
            Some("atom:title") => title = field.get(2).and_then(Value::as_str),
            Some("atom:link") => {
                link = field
                    .get(1)
                    .and_then(|attrs| attrs.get("href"))
                    .and_then(Value::as_str)
            }
            _ => {}
        }
    }

    Some(RawRecord::new(strip_extension(link?), title?))
}

/// Drop a trailing `.ext` from the last path segment.
fn strip_extension(href: &str) -> String {
    let segment_start = href.rfind('/').map(|i| i + 1).unwrap_or(0);
    match href[segment_start..].rfind('.') {
        Some(dot) if dot > 0 => href[..segment_start + dot].to_string(),
        _ => href.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flat() {
        let body = json!([
            {"id": "n1", "label": "Santa Cruz (Calif.)"},
            {"id": "n2", "label": "Santa Cruz, Bolivia"},
        ])
        .to_string();
        let records = parse_body(ResponseFormat::Flat, &body).unwrap();
        assert_eq!(
            records,
            vec![
                RawRecord::new("n1", "Santa Cruz (Calif.)"),
                RawRecord::new("n2", "Santa Cruz, Bolivia"),
            ]
        );
    }

    #[test]
    fn test_flat_skips_incomplete_items() {
        let value = json!([
            {"id": "n1"},
            {"label": "x"},
            {"id": "n3", "label": "Kept", "extra": 1},
        ]);
        let records = parse_flat(&value).unwrap();
        assert_eq!(records, vec![RawRecord::new("n3", "Kept")]);
    }

    #[test]
    fn test_flat_rejects_non_array() {
        let err = parse_body(ResponseFormat::Flat, r#"{"error":"nope"}"#).unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));
    }

    #[test]
    fn test_malformed_json() {
        let err = parse_body(ResponseFormat::Flat, "<html>502</html>").unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));
    }

    #[test]
    fn test_nested() {
        let body = json!([
            "atom:feed",
            ["atom:title", {}, "Search results"],
            [
                "atom:entry",
                ["atom:title", {}, "Santa Cruz (Calif.)"],
                [
                    "atom:link",
                    {
                        "rel": "alternate",
                        "href": "http://id.loc.gov/authorities/names/n79041717.html"
                    }
                ],
                ["atom:id", {}, "info:lc/authorities/names/n79041717"]
            ],
            [
                "atom:entry",
                ["atom:title", {}, "Santa Cruz Island (Calif.)"],
                ["atom:id", {}, "info:lc/authorities/names/n80001234"]
            ],
            ["atom:entry", ["atom:id", {}, "info:lc/no-title"]]
        ])
        .to_string();

        let records = parse_body(ResponseFormat::NestedTuple, &format!("({});", body)).unwrap();
        assert_eq!(
            records,
            vec![RawRecord::new(
                "http://id.loc.gov/authorities/names/n79041717",
                "Santa Cruz (Calif.)"
            )]
        );
    }

    #[test]
    fn test_nested_entry_without_link_is_skipped() {
        let value = json!([[
            "atom:entry",
            ["atom:title", {}, "Santa Cruz Island (Calif.)"],
            ["atom:id", {}, "info:lc/authorities/names/n80001234"]
        ]]);
        assert!(parse_nested(&value).unwrap().is_empty());
    }

    #[test]
    fn test_strip_extension() {
        assert_eq!(strip_extension("http://x.org/a/n1.html"), "http://x.org/a/n1");
        assert_eq!(strip_extension("http://x.org/a/n1"), "http://x.org/a/n1");
        assert_eq!(strip_extension("http://x.org/a.b/n1"), "http://x.org/a.b/n1");
        assert_eq!(strip_extension("http://x.org/a/.hidden"), "http://x.org/a/.hidden");
    }
}
