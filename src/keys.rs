//! Cache Key Derivation
//!
//! Maps resource descriptors to storage keys: a namespace prefix followed by
//! the base64 of the identifying text and, for queries, fixed-order suffixes.
//! Standard base64 never contains `_`, so the encoded segment can always be
//! split back out and decoded for listings.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Serialize;

use crate::convert::not_empty_string;

/// Suggest prefixes longer than this are never cached
pub const SUGGEST_MAX_CHARS: usize = 8;

// == Namespace ==
/// Logical collection of cache entries, identified by key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Namespace {
    Page,
    PageLinks,
    Search,
    Suggest,
}

impl Namespace {
    pub const ALL: [Namespace; 4] = [
        Namespace::Page,
        Namespace::PageLinks,
        Namespace::Search,
        Namespace::Suggest,
    ];

    pub fn prefix(self) -> &'static str {
        match self {
            Namespace::Page => "page_",
            Namespace::PageLinks => "pl_",
            Namespace::Search => "search_",
            Namespace::Suggest => "suggest_",
        }
    }

    /// The namespace a key belongs to, if any.
    pub fn of_key(key: &str) -> Option<Namespace> {
        Self::ALL.into_iter().find(|ns| key.starts_with(ns.prefix()))
    }

    fn key(self, segments: &[&str]) -> String {
        let mut key = String::from(self.prefix());
        key.push_str(&segments.join("_"));
        key
    }
}

fn encode_text(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

/// Key for scraped page content.
pub fn page_key(uri: &str) -> String {
    Namespace::Page.key(&[&encode_text(uri)])
}

/// Key for the link list of a page.
pub fn links_key(uri: &str) -> String {
    Namespace::PageLinks.key(&[&encode_text(uri)])
}

/// Key for a page of search results.
///
/// Country, language and page (only when above 1) are appended in that
/// order when present.
pub fn search_key(text: &str, country: &str, lang: &str, page: u32) -> String {
    let encoded = encode_text(text);
    let page_part = format!("p{page}");
    let mut segments = vec![encoded.as_str()];
    if not_empty_string(country, 1) {
        segments.push(country.trim());
    }
    if not_empty_string(lang, 1) {
        segments.push(lang.trim());
    }
    if page > 1 {
        segments.push(&page_part);
    }
    Namespace::Search.key(&segments)
}

/// Key for autosuggest terms, or `None` when the prefix is too long (or
/// blank) to be cached.
///
/// Country and language are appended only when shorter than 3 characters.
pub fn suggest_key(text: &str, country: &str, lang: &str) -> Option<String> {
    if !not_empty_string(text, 1) || text.chars().count() > SUGGEST_MAX_CHARS {
        return None;
    }
    let encoded = encode_text(text);
    let mut segments = vec![encoded.as_str()];
    for extra in [country.trim(), lang.trim()] {
        if !extra.is_empty() && extra.chars().count() < 3 {
            segments.push(extra);
        }
    }
    Some(Namespace::Suggest.key(&segments))
}

/// Recovers the original text from a derived key.
pub fn decode_key_text(key: &str) -> Option<String> {
    let ns = Namespace::of_key(key)?;
    let rest = &key[ns.prefix().len()..];
    let encoded = rest.split('_').next()?;
    let bytes = STANDARD.decode(encoded).ok()?;
    String::from_utf8(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_key_known_value() {
        assert_eq!(page_key("AI"), "page_QUk=");
        assert_eq!(links_key("AI"), "pl_QUk=");
    }

    #[test]
    fn test_search_key_suffix_order() {
        assert_eq!(search_key("AI", "", "", 1), "search_QUk=");
        assert_eq!(search_key("AI", "gb", "", 1), "search_QUk=_gb");
        assert_eq!(search_key("AI", "", "en", 1), "search_QUk=_en");
        assert_eq!(search_key("AI", "gb", "en", 3), "search_QUk=_gb_en_p3");
        assert_eq!(search_key("AI", "  ", "en", 1), "search_QUk=_en");
    }

    #[test]
    fn test_search_key_distinguishes_fields() {
        let base = search_key("rust cache", "gb", "en", 2);
        assert_eq!(base, search_key("rust cache", "gb", "en", 2));
        assert_ne!(base, search_key("rust cache", "us", "en", 2));
        assert_ne!(base, search_key("rust cache", "gb", "fr", 2));
        assert_ne!(base, search_key("rust cache", "gb", "en", 3));
        assert_ne!(base, search_key("rust caches", "gb", "en", 2));
    }

    #[test]
    fn test_suggest_key_bounds() {
        assert_eq!(suggest_key("AI", "", ""), Some("suggest_QUk=".to_string()));
        assert!(suggest_key("abcdefgh", "", "").is_some());
        assert!(suggest_key("abcdefghi", "", "").is_none());
        assert!(suggest_key("", "", "").is_none());
    }

    #[test]
    fn test_suggest_key_short_locale_fields_only() {
        assert_eq!(
            suggest_key("AI", "gb", "en"),
            Some("suggest_QUk=_gb_en".to_string())
        );
        assert_eq!(
            suggest_key("AI", "gbr", "en-GB"),
            Some("suggest_QUk=".to_string())
        );
    }

    #[test]
    fn test_decode_key_text_roundtrip() {
        let query = "ça/va? plus+moins";
        assert_eq!(
            decode_key_text(&search_key(query, "fr", "fr", 4)).as_deref(),
            Some(query)
        );
        assert_eq!(
            decode_key_text(&page_key("https://example.com/a b")).as_deref(),
            Some("https://example.com/a b")
        );
        assert_eq!(decode_key_text("other_QUk="), None);
        assert_eq!(decode_key_text("search_!!!"), None);
    }

    #[test]
    fn test_namespace_of_key() {
        assert_eq!(Namespace::of_key("page_x"), Some(Namespace::Page));
        assert_eq!(Namespace::of_key("pl_x"), Some(Namespace::PageLinks));
        assert_eq!(Namespace::of_key("suggest_x"), Some(Namespace::Suggest));
        assert_eq!(Namespace::of_key("current-user"), None);
    }
}
