//! Remote Source Module
//!
//! The search/scrape API the cache sits in front of. Wrappers only see the
//! [`RemoteSource`] trait; [`HttpRemote`] is the production transport.

mod http;

use async_trait::async_trait;
use serde_json::Value;
use url::form_urlencoded;

pub use http::HttpRemote;

use crate::error::RemoteError;

// == Remote Source ==
/// Transport returning JSON payloads.
///
/// Implementations return `Ok` only for a body that is a JSON object or list.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// `GET <base>/<path>`; `path` may carry a query string.
    async fn fetch_content(&self, path: &str) -> Result<Value, RemoteError>;

    /// `POST <base>/<path>` with a JSON body.
    async fn post_data(&self, path: &str, params: &Value) -> Result<Value, RemoteError>;
}

/// Appends a form-encoded query string to `path`.
pub fn with_query(path: &str, params: &[(&str, String)]) -> String {
    if params.is_empty() {
        return path.to_string();
    }
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())))
        .finish();
    format!("{path}?{query}")
}

/// Rejects bodies that are not an object or a list.
pub fn usable_body(path: &str, body: Value) -> Result<Value, RemoteError> {
    if body.is_object() || body.is_array() {
        Ok(body)
    } else {
        Err(RemoteError::EmptyBody(path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_with_query_encodes_values() {
        let path = with_query(
            "seek/search",
            &[("q", "a b/c&d".to_string()), ("cc", "gb".to_string())],
        );
        assert_eq!(path, "seek/search?q=a+b%2Fc%26d&cc=gb");
    }

    #[test]
    fn test_with_query_empty() {
        assert_eq!(with_query("seek/search", &[]), "seek/search");
    }

    #[test]
    fn test_usable_body() {
        assert!(usable_body("x", json!({"a": 1})).is_ok());
        assert!(usable_body("x", json!([1])).is_ok());
        assert!(matches!(usable_body("x", json!(null)), Err(RemoteError::EmptyBody(_))));
        assert!(matches!(usable_body("x", json!("text")), Err(RemoteError::EmptyBody(_))));
    }
}
