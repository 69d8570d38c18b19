//! API Routes
//!
//! Configures the Axum router with all cache endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    delete_handler, evict_handler, health_handler, links_handler, page_handler, recent_handler,
    scan_handler, search_handler, stats_handler, suggest_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /page?uri=&full=` - Page content, cache first
/// - `GET /links?uri=` - Links of a page, cache first
/// - `GET /search?q=&cc=&lang=&page=` - Search results, cache first
/// - `GET /suggest?q=&cc=&lang=` - Autosuggest terms, cache first
/// - `GET /recent?limit=` - Recently cached search queries
/// - `GET /cache/scan/:prefix` - Entries of a namespace
/// - `POST /cache/evict` - Apply a byte budget to a namespace
/// - `DELETE /cache/:key?fuzzy=` - Delete a key, a prefix, or `all`
/// - `GET /stats` - Cache statistics
/// - `GET /health` - Health check endpoint
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/page", get(page_handler))
        .route("/links", get(links_handler))
        .route("/search", get(search_handler))
        .route("/suggest", get(suggest_handler))
        .route("/recent", get(recent_handler))
        .route("/cache/scan/:prefix", get(scan_handler))
        .route("/cache/evict", post(evict_handler))
        .route("/cache/:key", delete(delete_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
