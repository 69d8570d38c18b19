//! Search result and link list models.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::convert::{non_empty_field, value_to_bool, value_to_int};

// == Search Result ==
/// One hit returned by the search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub date: Option<DateTime<Utc>>,
    pub summary: String,
    pub title: String,
    pub uri: String,
    /// Provider name, `unknown` when not reported
    pub source: String,
}

impl Default for SearchResult {
    fn default() -> Self {
        Self {
            date: None,
            summary: String::new(),
            title: String::new(),
            uri: String::new(),
            source: "unknown".to_string(),
        }
    }
}

impl SearchResult {
    pub fn from_json(data: &Value) -> Self {
        let mut result = Self::default();
        if !data.is_object() {
            return result;
        }
        result.date = data.get("date").and_then(Value::as_str).and_then(parse_date);
        result.title = non_empty_field(data, "title", 1).unwrap_or_default();
        result.summary = non_empty_field(data, "summary", 1).unwrap_or_default();
        result.uri = non_empty_field(data, "uri", 1).unwrap_or_default();
        if let Some(provider) = non_empty_field(data, "provider", 1) {
            result.source = provider;
        }
        result
    }

    pub fn has_uri(&self) -> bool {
        self.uri.starts_with("https://") || self.uri.starts_with("http://")
    }
}

/// Accepts RFC 3339, a bare `YYYY-MM-DDTHH:MM:SS` or a plain date.
fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// == Search Result Set ==
/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultSet {
    pub page: i64,
    pub count: i64,
    pub lang: String,
    pub results: Vec<SearchResult>,
}

impl Default for SearchResultSet {
    fn default() -> Self {
        Self {
            page: 1,
            count: 0,
            lang: String::new(),
            results: Vec::new(),
        }
    }
}

impl SearchResultSet {
    pub fn from_json(data: &Value) -> Self {
        let mut set = Self::default();
        if !data.is_object() {
            return set;
        }
        set.lang = non_empty_field(data, "lang", 1).unwrap_or_default();
        set.page = value_to_int(data.get("page")).max(1);
        set.count = value_to_int(data.get("count")).max(0);
        if let Some(Value::Array(rows)) = data.get("results") {
            set.results = rows.iter().map(SearchResult::from_json).collect();
        }
        set
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

// == Link Result ==
/// A link found on a scraped page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkResult {
    /// Same-domain link
    pub local: bool,
    pub summary: String,
    pub title: String,
    pub uri: String,
}

impl LinkResult {
    pub fn from_json(data: &Value) -> Self {
        Self {
            local: value_to_bool(data.get("local"), false),
            summary: non_empty_field(data, "summary", 1).unwrap_or_default(),
            title: non_empty_field(data, "title", 1).unwrap_or_default(),
            uri: non_empty_field(data, "uri", 1).unwrap_or_default(),
        }
    }
}

// == Link Result Set ==
/// Links of one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkResultSet {
    pub uri: String,
    pub results: Vec<LinkResult>,
}

impl LinkResultSet {
    /// Builds a set from raw link rows; rows that are not objects are skipped.
    pub fn new(links: &[Value], uri: &str) -> Self {
        Self {
            uri: if uri.trim().is_empty() { String::new() } else { uri.to_string() },
            results: links
                .iter()
                .filter(|row| row.is_object())
                .map(LinkResult::from_json)
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_result_from_json() {
        let result = SearchResult::from_json(&json!({
            "date": "2024-03-01T10:00:00Z",
            "title": "Rust",
            "summary": "Systems language",
            "uri": "https://rust-lang.org",
            "provider": "brave"
        }));
        assert_eq!(result.title, "Rust");
        assert_eq!(result.source, "brave");
        assert!(result.has_uri());
        assert_eq!(result.date.unwrap().to_rfc3339(), "2024-03-01T10:00:00+00:00");
    }

    #[test]
    fn test_search_result_defaults() {
        let result = SearchResult::from_json(&json!({"date": "yesterday", "uri": "ftp://x"}));
        assert_eq!(result.source, "unknown");
        assert!(result.date.is_none());
        assert!(!result.has_uri());
    }

    #[test]
    fn test_parse_plain_date() {
        let date = parse_date("2023-12-25").unwrap();
        assert_eq!(date.to_rfc3339(), "2023-12-25T00:00:00+00:00");
    }

    #[test]
    fn test_search_result_set_from_json() {
        let set = SearchResultSet::from_json(&json!({
            "page": "2",
            "count": 40,
            "lang": "en",
            "results": [{"title": "a"}, {"title": "b"}]
        }));
        assert_eq!(set.page, 2);
        assert_eq!(set.count, 40);
        assert_eq!(set.results.len(), 2);
    }

    #[test]
    fn test_search_result_set_page_floor() {
        let set = SearchResultSet::from_json(&json!({"page": 0, "count": -3}));
        assert_eq!(set.page, 1);
        assert_eq!(set.count, 0);
        assert!(set.is_empty());
    }

    #[test]
    fn test_link_set_skips_non_objects() {
        let links = vec![
            json!({"uri": "https://a.org", "title": "A", "local": "yes"}),
            json!("https://b.org"),
            json!({"uri": "https://c.org"}),
        ];
        let set = LinkResultSet::new(&links, "https://a.org");
        assert_eq!(set.results.len(), 2);
        assert!(set.results[0].local);
        assert!(!set.results[1].local);
        assert_eq!(set.uri, "https://a.org");
    }
}
