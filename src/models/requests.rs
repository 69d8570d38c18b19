//! Request DTOs for the HTTP facade
//!
//! Query strings and bodies accepted by the cache endpoints.

use serde::Deserialize;

/// Query for `GET /page`
#[derive(Debug, Clone, Deserialize)]
pub struct PageQuery {
    pub uri: String,
    /// Bypass the cached copy and scrape through a browser
    #[serde(default)]
    pub full: bool,
}

/// Query for `GET /links`
#[derive(Debug, Clone, Deserialize)]
pub struct LinksQuery {
    pub uri: String,
}

/// Query for `GET /search`
#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    #[serde(default)]
    pub cc: String,
    #[serde(default)]
    pub lang: String,
    #[serde(default = "first_page")]
    pub page: u32,
}

fn first_page() -> u32 {
    1
}

/// Query for `GET /suggest`
#[derive(Debug, Clone, Deserialize)]
pub struct SuggestQuery {
    pub q: String,
    #[serde(default)]
    pub cc: String,
    #[serde(default)]
    pub lang: String,
}

/// Query for `GET /recent`
#[derive(Debug, Clone, Deserialize)]
pub struct RecentQuery {
    #[serde(default = "default_recent_limit")]
    pub limit: usize,
}

fn default_recent_limit() -> usize {
    20
}

/// Query for `DELETE /cache/:key`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub fuzzy: bool,
}

/// Body for `POST /cache/evict`
#[derive(Debug, Clone, Deserialize)]
pub struct EvictRequest {
    /// Namespace prefix, e.g. `page_`
    pub prefix: String,
    /// Byte budget for the namespace
    pub budget: usize,
}

impl EvictRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.prefix.trim().is_empty() {
            return Some("Prefix cannot be empty".to_string());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_query_defaults() {
        let query: SearchQuery = serde_json::from_str(r#"{"q": "rust"}"#).unwrap();
        assert_eq!(query.q, "rust");
        assert_eq!(query.page, 1);
        assert!(query.cc.is_empty());
    }

    #[test]
    fn test_page_query_full_flag() {
        let query: PageQuery =
            serde_json::from_str(r#"{"uri": "https://a.org", "full": true}"#).unwrap();
        assert!(query.full);
    }

    #[test]
    fn test_recent_query_default_limit() {
        let query: RecentQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.limit, 20);
    }

    #[test]
    fn test_evict_request_validate() {
        let req = EvictRequest {
            prefix: " ".to_string(),
            budget: 10,
        };
        assert!(req.validate().is_some());

        let req = EvictRequest {
            prefix: "page_".to_string(),
            budget: 10,
        };
        assert!(req.validate().is_none());
    }
}
