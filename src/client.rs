//! Read-Through Client
//!
//! Cache-first wrappers over the remote search/scrape API. Each call derives a
//! key, serves a fresh cached copy when there is one, and otherwise fetches,
//! writes back usable results and returns them. Failures never escape: a call
//! that cannot be satisfied returns an empty default result.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::{CacheStats, EvictionReport, LocalCache, ScanResult};
use crate::config::{Config, DEFAULT_PAGE_BYTE_BUDGET};
use crate::convert::not_empty_string;
use crate::error::RemoteError;
use crate::keys::{self, Namespace};
use crate::models::{LinkResultSet, PageResult, SearchResultSet};
use crate::remote::{with_query, RemoteSource};

// == TTLs ==
pub const PAGE_TTL_SECS: i64 = 60 * 60;
pub const LINKS_TTL_SECS: i64 = 60 * 60;
pub const SEARCH_TTL_SECS: i64 = 60 * 60;
pub const SUGGEST_TTL_SECS: i64 = 24 * 60 * 60;

// == Remote Endpoints ==
const PAGE_PATH: &str = "scrape/get-page";
const PAGE_FULL_PATH: &str = "scrape/get-page-from-browser";
const LINKS_PATH: &str = "scrape/get-links";
const SEARCH_PATH: &str = "seek/search";
const SUGGEST_PATH: &str = "seek/suggest";

/// A previously cached search, recovered from its key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentSearch {
    pub key: String,
    pub query: String,
    pub timestamp: i64,
}

// == Seek Client ==
/// Read-through cache in front of a [`RemoteSource`].
///
/// The cache lock is never held across a remote call, so concurrent calls for
/// the same key may both fetch; the last write wins.
#[derive(Clone)]
pub struct SeekClient {
    cache: Arc<RwLock<LocalCache>>,
    remote: Arc<dyn RemoteSource>,
    page_byte_budget: usize,
}

impl SeekClient {
    pub fn new(cache: LocalCache, remote: Arc<dyn RemoteSource>) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
            remote,
            page_byte_budget: DEFAULT_PAGE_BYTE_BUDGET,
        }
    }

    pub fn from_config(config: &Config, cache: LocalCache, remote: Arc<dyn RemoteSource>) -> Self {
        Self::new(cache, remote).with_page_byte_budget(config.page_byte_budget)
    }

    /// Sets the byte budget enforced on page content after each page write.
    pub fn with_page_byte_budget(mut self, budget: usize) -> Self {
        self.page_byte_budget = budget;
        self
    }

    /// Shared handle to the underlying cache.
    pub fn cache(&self) -> Arc<RwLock<LocalCache>> {
        self.cache.clone()
    }

    // == Page Content ==
    /// Readable content of `uri`.
    ///
    /// `full_mode` skips the cached copy and scrapes through a browser; the
    /// fresh result is still written back.
    pub async fn fetch_text_page(&self, uri: &str, full_mode: bool) -> PageResult {
        let key = keys::page_key(uri);

        if !full_mode {
            if let Some(data) = self.cached_json(&key, PAGE_TTL_SECS).await.filter(Value::is_object) {
                debug!("Page cache hit for {}", uri);
                let mut page = PageResult::from_json(&data, uri);
                page.stats.cached = true;
                return page;
            }
        }

        match self.page_from_remote(uri, full_mode).await {
            Ok(data) => {
                {
                    let mut cache = self.cache.write().await;
                    cache.put(&key, data.clone());
                    cache.evict_after_write(Namespace::Page.prefix(), self.page_byte_budget, &key);
                }
                PageResult::from_json(&data, uri)
            }
            Err(err) => {
                warn!("Page fetch failed for {}: {}", uri, err);
                PageResult::default()
            }
        }
    }

    async fn page_from_remote(&self, uri: &str, full_mode: bool) -> Result<Value, RemoteError> {
        ensure_web_uri(uri)?;
        let path = if full_mode { PAGE_FULL_PATH } else { PAGE_PATH };
        let data = self.remote.post_data(path, &json!({ "uri": uri })).await?;
        if data.is_object() {
            Ok(data)
        } else {
            Err(RemoteError::EmptyBody(path.to_string()))
        }
    }

    // == Page Links ==
    /// Links found on `uri`. Empty link lists are not cached.
    pub async fn fetch_page_links(&self, uri: &str) -> LinkResultSet {
        let key = keys::links_key(uri);

        if let Some(data) = self.cached_json(&key, LINKS_TTL_SECS).await {
            if let Some(links) = non_empty_array(&data, "links") {
                debug!("Links cache hit for {}", uri);
                return LinkResultSet::new(links, uri);
            }
        }

        match self.links_from_remote(uri).await {
            Ok(links) if !links.is_empty() => {
                let result = LinkResultSet::new(&links, uri);
                self.cache.write().await.put(&key, json!({ "links": links }));
                result
            }
            Ok(_) => LinkResultSet::default(),
            Err(err) => {
                warn!("Link fetch failed for {}: {}", uri, err);
                LinkResultSet::default()
            }
        }
    }

    async fn links_from_remote(&self, uri: &str) -> Result<Vec<Value>, RemoteError> {
        ensure_web_uri(uri)?;
        let data = self.remote.post_data(LINKS_PATH, &json!({ "uri": uri })).await?;
        match data.get("links") {
            Some(Value::Array(links)) => Ok(links.clone()),
            _ => Err(RemoteError::EmptyBody(LINKS_PATH.to_string())),
        }
    }

    // == Search Results ==
    /// One page of results for `text`. Result sets with no hits are returned
    /// but not cached.
    pub async fn fetch_search_results(
        &self,
        text: &str,
        country: &str,
        lang: &str,
        page: u32,
    ) -> SearchResultSet {
        let key = keys::search_key(text, country, lang, page);

        if let Some(data) = self.cached_json(&key, SEARCH_TTL_SECS).await.filter(Value::is_object) {
            debug!("Search cache hit for {:?}", text);
            return SearchResultSet::from_json(&data);
        }

        match self.search_from_remote(text, country, lang, page).await {
            Ok(data) => {
                if non_empty_array(&data, "results").is_some() {
                    self.cache.write().await.put(&key, data.clone());
                }
                SearchResultSet::from_json(&data)
            }
            Err(err) => {
                warn!("Search failed for {:?}: {}", text, err);
                SearchResultSet::default()
            }
        }
    }

    async fn search_from_remote(
        &self,
        text: &str,
        country: &str,
        lang: &str,
        page: u32,
    ) -> Result<Value, RemoteError> {
        if !not_empty_string(text, 2) {
            return Err(RemoteError::InvalidRequest("search text too short".to_string()));
        }
        let mut params = locale_params(text, country, lang, 6);
        if page > 1 {
            params.push(("p", page.to_string()));
        }
        let path = with_query(SEARCH_PATH, &params);
        let data = self.remote.fetch_content(&path).await?;
        if data.is_object() {
            Ok(data)
        } else {
            Err(RemoteError::EmptyBody(SEARCH_PATH.to_string()))
        }
    }

    // == Suggest Terms ==
    /// Autosuggest terms for `letters`.
    ///
    /// Only prefixes of at most eight characters are cached; longer ones go to
    /// the remote every time.
    pub async fn fetch_suggest_list(&self, letters: &str, country: &str, lang: &str) -> Vec<String> {
        if !not_empty_string(letters, 2) {
            return Vec::new();
        }
        let key = keys::suggest_key(letters, country, lang);

        if let Some(key) = &key {
            if let Some(Value::Array(items)) = self.cached_json(key, SUGGEST_TTL_SECS).await {
                debug!("Suggest cache hit for {:?}", letters);
                return strings(&items);
            }
        }

        match self.suggest_from_remote(letters, country, lang).await {
            Ok(terms) => {
                if let Some(key) = key.as_deref().filter(|_| !terms.is_empty()) {
                    self.cache.write().await.put(key, Value::from(terms.clone()));
                }
                terms
            }
            Err(err) => {
                warn!("Suggest failed for {:?}: {}", letters, err);
                Vec::new()
            }
        }
    }

    async fn suggest_from_remote(
        &self,
        letters: &str,
        country: &str,
        lang: &str,
    ) -> Result<Vec<String>, RemoteError> {
        let params = locale_params(letters, country, lang, 6);
        let data = self.remote.fetch_content(&with_query(SUGGEST_PATH, &params)).await?;
        match data.get("results") {
            Some(Value::Array(items)) => Ok(strings(items)),
            _ => Err(RemoteError::EmptyBody(SUGGEST_PATH.to_string())),
        }
    }

    // == Recent Searches ==
    /// Distinct cached search queries, newest first.
    pub async fn recent_searches(&self, limit: usize) -> Vec<RecentSearch> {
        let scan = self.cache.write().await.scan(Namespace::Search.prefix());
        let mut seen = HashSet::new();
        scan.items
            .into_iter()
            .filter_map(|item| {
                let query = keys::decode_key_text(&item.key)?;
                seen.insert(query.clone()).then_some(RecentSearch {
                    key: item.key,
                    query,
                    timestamp: item.timestamp,
                })
            })
            .take(limit)
            .collect()
    }

    // == Cache Pass-Throughs ==
    pub async fn stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }

    pub async fn is_storage_available(&self) -> bool {
        self.cache.read().await.is_available()
    }

    pub async fn scan(&self, prefix: &str) -> ScanResult {
        self.cache.write().await.scan(prefix)
    }

    pub async fn evict(&self, prefix: &str, byte_budget: usize) -> EvictionReport {
        self.cache.write().await.evict_over_budget(prefix, byte_budget)
    }

    pub async fn clear(&self, key: &str, fuzzy: bool) -> bool {
        self.cache.write().await.delete(key, fuzzy)
    }

    /// Fresh JSON under `key`. A corrupt record is deleted and read as a miss.
    async fn cached_json(&self, key: &str, max_age_secs: i64) -> Option<Value> {
        let mut cache = self.cache.write().await;
        match cache.get(key, max_age_secs) {
            Ok(view) => view.into_fresh_json(),
            Err(err) => {
                warn!("Dropping corrupt cache entry {}: {}", key, err);
                if cache.delete(key, false) {
                    cache.stats_mut().record_healed();
                }
                None
            }
        }
    }
}

/// Page and link requests need an absolute http(s) URI.
fn ensure_web_uri(uri: &str) -> Result<(), RemoteError> {
    let web = uri.starts_with("https://") || uri.starts_with("http://");
    if not_empty_string(uri, 7) && web {
        Ok(())
    } else {
        Err(RemoteError::InvalidRequest(format!("not a web uri: {uri:?}")))
    }
}

/// `q` plus `cc` (under 3 chars) and `lang` (under `max_lang` chars) when set.
fn locale_params(text: &str, country: &str, lang: &str, max_lang: usize) -> Vec<(&'static str, String)> {
    let mut params = vec![("q", text.to_string())];
    if not_empty_string(country, 1) && country.chars().count() < 3 {
        params.push(("cc", country.to_string()));
    }
    if not_empty_string(lang, 1) && lang.chars().count() < max_lang {
        params.push(("lang", lang.to_string()));
    }
    params
}

fn non_empty_array<'a>(data: &'a Value, field: &str) -> Option<&'a [Value]> {
    match data.get(field) {
        Some(Value::Array(items)) if !items.is_empty() => Some(items.as_slice()),
        _ => None,
    }
}

fn strings(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| item.as_str().map(str::to_string))
        .collect()
}
