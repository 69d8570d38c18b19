//! Models
//!
//! Domain results built from remote payloads, and the request/response DTOs
//! of the HTTP facade.

pub mod page;
pub mod requests;
pub mod responses;
pub mod search;

// Re-export commonly used types
pub use page::{PageResult, PageStats};
pub use requests::{
    DeleteQuery, EvictRequest, LinksQuery, PageQuery, RecentQuery, SearchQuery, SuggestQuery,
};
pub use responses::{DeleteResponse, HealthResponse, StatsResponse, SuggestResponse};
pub use search::{LinkResult, LinkResultSet, SearchResult, SearchResultSet};
