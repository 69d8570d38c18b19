//! API Handlers
//!
//! HTTP request handlers exposing the read-through client and cache upkeep.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::cache::{EvictionReport, LocalCache, ScanResult};
use crate::client::{RecentSearch, SeekClient};
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::models::{
    DeleteQuery, DeleteResponse, EvictRequest, HealthResponse, LinkResultSet, LinksQuery,
    PageQuery, PageResult, RecentQuery, SearchQuery, SearchResultSet, StatsResponse,
    SuggestQuery, SuggestResponse,
};
use crate::remote::RemoteSource;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub client: SeekClient,
}

impl AppState {
    pub fn new(client: SeekClient) -> Self {
        Self { client }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config, cache: LocalCache, remote: Arc<dyn RemoteSource>) -> Self {
        Self::new(SeekClient::from_config(config, cache, remote))
    }
}

/// Handler for GET /page
pub async fn page_handler(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Json<PageResult> {
    Json(state.client.fetch_text_page(&query.uri, query.full).await)
}

/// Handler for GET /links
pub async fn links_handler(
    State(state): State<AppState>,
    Query(query): Query<LinksQuery>,
) -> Json<LinkResultSet> {
    Json(state.client.fetch_page_links(&query.uri).await)
}

/// Handler for GET /search
pub async fn search_handler(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<SearchResultSet> {
    let results = state
        .client
        .fetch_search_results(&query.q, &query.cc, &query.lang, query.page)
        .await;
    Json(results)
}

/// Handler for GET /suggest
pub async fn suggest_handler(
    State(state): State<AppState>,
    Query(query): Query<SuggestQuery>,
) -> Json<SuggestResponse> {
    let terms = state
        .client
        .fetch_suggest_list(&query.q, &query.cc, &query.lang)
        .await;
    Json(SuggestResponse::new(query.q, terms))
}

/// Handler for GET /recent
pub async fn recent_handler(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> Json<Vec<RecentSearch>> {
    Json(state.client.recent_searches(query.limit).await)
}

/// Handler for GET /cache/scan/:prefix
pub async fn scan_handler(
    State(state): State<AppState>,
    Path(prefix): Path<String>,
) -> Json<ScanResult> {
    Json(state.client.scan(&prefix).await)
}

/// Handler for POST /cache/evict
pub async fn evict_handler(
    State(state): State<AppState>,
    Json(req): Json<EvictRequest>,
) -> Result<Json<EvictionReport>> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }
    Ok(Json(state.client.evict(&req.prefix, req.budget).await))
}

/// Handler for DELETE /cache/:key
///
/// `all` clears every unprotected key; `?fuzzy=true` clears a prefix.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> Json<DeleteResponse> {
    let deleted = state.client.clear(&key, query.fuzzy).await;
    Json(DeleteResponse::new(key, query.fuzzy, deleted))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.client.stats().await))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::new(state.client.is_storage_available().await))
}
