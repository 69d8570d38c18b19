//! Configuration Module
//!
//! Handles loading and managing configuration from environment variables.

use std::env;
use std::str::FromStr;

/// Default remote API base URL
pub const DEFAULT_API_BASE: &str = "http://localhost:8787/api";

/// Default byte budget for the page-content namespace (2 MiB)
pub const DEFAULT_PAGE_BYTE_BUDGET: usize = 2 * 1024 * 1024;

/// Runtime configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the search/scrape API
    pub api_base: String,
    /// Key sent in the `api-key` header
    pub api_key: String,
    /// HTTP server port
    pub server_port: u16,
    /// JSON file backing the cache, None = in-memory
    pub store_path: Option<String>,
    /// Byte budget for cached page content
    pub page_byte_budget: usize,
    /// Background sweep interval in seconds
    pub sweep_interval: u64,
    /// Remote request timeout in seconds
    pub remote_timeout: u64,
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `API_BASE` - Remote API base URL (default: http://localhost:8787/api)
    /// - `API_KEY` - Remote API key (default: empty)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `STORE_PATH` - Cache file path (default: unset, in-memory)
    /// - `PAGE_BYTE_BUDGET` - Page namespace budget in bytes (default: 2 MiB)
    /// - `SWEEP_INTERVAL` - Sweep frequency in seconds (default: 300)
    /// - `REMOTE_TIMEOUT` - Remote timeout in seconds (default: 15)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_base: env::var("API_BASE").unwrap_or(defaults.api_base),
            api_key: env::var("API_KEY").unwrap_or(defaults.api_key),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            store_path: env::var("STORE_PATH").ok().filter(|p| !p.trim().is_empty()),
            page_byte_budget: env_or("PAGE_BYTE_BUDGET", defaults.page_byte_budget),
            sweep_interval: env_or("SWEEP_INTERVAL", defaults.sweep_interval),
            remote_timeout: env_or("REMOTE_TIMEOUT", defaults.remote_timeout),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: String::new(),
            server_port: 3000,
            store_path: None,
            page_byte_budget: DEFAULT_PAGE_BYTE_BUDGET,
            sweep_interval: 300,
            remote_timeout: 15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.page_byte_budget, 2 * 1024 * 1024);
        assert_eq!(config.sweep_interval, 300);
        assert!(config.store_path.is_none());
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("API_BASE");
        env::remove_var("SERVER_PORT");
        env::remove_var("STORE_PATH");
        env::remove_var("PAGE_BYTE_BUDGET");
        env::remove_var("SWEEP_INTERVAL");

        let config = Config::from_env();
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.page_byte_budget, DEFAULT_PAGE_BYTE_BUDGET);
        assert_eq!(config.sweep_interval, 300);
        assert!(config.store_path.is_none());
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        env::set_var("SEEK_CACHE_TEST_PORT", "not-a-port");
        assert_eq!(env_or("SEEK_CACHE_TEST_PORT", 42u16), 42);
        env::set_var("SEEK_CACHE_TEST_PORT", "8081");
        assert_eq!(env_or("SEEK_CACHE_TEST_PORT", 42u16), 8081);
        env::remove_var("SEEK_CACHE_TEST_PORT");
    }
}
