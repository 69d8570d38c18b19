//! API Module
//!
//! HTTP handlers and routing for the local cache facade.
//!
//! # Endpoints
//! - `GET /page`, `/links`, `/search`, `/suggest` - Read-through lookups
//! - `GET /recent` - Recently cached searches
//! - `GET /cache/scan/:prefix`, `POST /cache/evict`, `DELETE /cache/:key` - Cache upkeep
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
