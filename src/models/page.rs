//! Scraped page content model.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::convert::{non_empty_field, value_to_int};

/// Pages with less text than this count as minimal
const MINIMAL_TEXT_LENGTH: i64 = 1024;

/// Pages with more links than this count as link-heavy
const MANY_LINKS: i64 = 8;

/// An opening or closing tag: `<` and a word character, up to the next `>`
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?\w[^>]*?>").expect("tag pattern is valid"));

// == Page Stats ==
/// Size figures reported by the scraper.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageStats {
    /// True when the page was served from the local cache
    pub cached: bool,
    pub compact_html_length: i64,
    pub compact_text_length: i64,
    pub source_html_length: i64,
    pub stripped_html_length: i64,
}

impl PageStats {
    pub fn from_json(data: &Value) -> Self {
        Self {
            cached: false,
            compact_html_length: value_to_int(data.get("compactHtmlLength")),
            compact_text_length: value_to_int(data.get("compactTextLength")),
            source_html_length: value_to_int(data.get("sourceHtmlLength")),
            stripped_html_length: value_to_int(data.get("strippedHtmlLength")),
        }
    }
}

// == Page Result ==
/// Readable content extracted from a page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult {
    pub inner_html: String,
    pub description: String,
    pub image: String,
    pub num_links: i64,
    pub text_length: i64,
    pub total_size: i64,
    pub stats: PageStats,
    pub domain_links: Vec<String>,
    pub lang: String,
    pub uri: String,
}

impl PageResult {
    /// Builds a page from the scraper payload `{content, stats}`.
    ///
    /// `uri` is used when the payload does not carry its own.
    pub fn from_json(data: &Value, uri: &str) -> Self {
        let mut page = Self::default();
        if !data.is_object() {
            return page;
        }

        if let Some(content) = data.get("content").filter(|c| c.is_object()) {
            page.stats = PageStats::from_json(content);
            if let Some(text) = non_empty_field(content, "bestText", 5) {
                page.inner_html = text.trim().to_string();
            }
            let compact = value_to_int(content.get("compactTextLength"));
            if compact > 0 {
                page.text_length = compact;
                if compact < 2500 && page.inner_html.len() > 16 {
                    let plain = strip_tags(&page.inner_html);
                    let plain_len = plain.chars().count() as i64;
                    if plain_len < 1250 {
                        page.text_length = plain_len;
                    }
                }
            }
        }

        if let Some(stats) = data.get("stats").filter(|s| s.is_object()) {
            if let Some(Value::Array(links)) = stats.get("domainLinks") {
                page.domain_links = links
                    .iter()
                    .filter_map(|link| link.as_str().map(str::to_string))
                    .collect();
            }
            page.num_links = value_to_int(stats.get("numLinks"));
            page.image = non_empty_field(stats, "image", 1).unwrap_or_default();
            page.description = non_empty_field(stats, "description", 1).unwrap_or_default();
            page.lang = non_empty_field(stats, "lang", 1).unwrap_or_default();
            page.uri = non_empty_field(stats, "uri", 5).unwrap_or_default();
            page.total_size = value_to_int(stats.get("sourceHtmlLength"));
        }

        if page.uri.len() < 5 && uri.trim().len() >= 5 {
            page.uri = uri.to_string();
        }
        page
    }

    pub fn has_content(&self) -> bool {
        self.inner_html.len() > 5 || !self.description.is_empty()
    }

    pub fn minimal_content(&self) -> bool {
        self.text_length < MINIMAL_TEXT_LENGTH
    }

    pub fn has_many_links(&self) -> bool {
        self.num_links > MANY_LINKS
    }
}

/// Drops markup and collapses whitespace.
fn strip_tags(html: &str) -> String {
    TAG_RE
        .replace_all(html, "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
