//! Seek Cache - a persistent local cache for a remote content service
//!
//! Wraps page, link, search and autosuggest lookups in a read-through cache
//! of timestamped records, with per-namespace byte budgets and self-healing
//! reads.

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod convert;
pub mod error;
pub mod keys;
pub mod models;
pub mod remote;
pub mod tasks;

pub use api::AppState;
pub use cache::LocalCache;
pub use client::SeekClient;
pub use config::Config;
pub use tasks::spawn_sweep_task;
