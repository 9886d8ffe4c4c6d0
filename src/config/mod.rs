//! Configuration module for the PageSync backend.
//!
//! Process configuration is loaded from environment variables with sensible defaults.
//! GitHub credentials are user data and live in the database, not here.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default GitHub REST endpoint.
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// User-Agent sent when fetching pages and sitemaps.
pub const PAGE_USER_AGENT: &str = "Mozilla/5.0 (compatible; PageSync/1.0)";

/// User-Agent sent to the GitHub API.
pub const GITHUB_USER_AGENT: &str = "PageSync/1.0";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key for dashboard API authentication (optional in development)
    pub api_psk: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Base URL of the GitHub REST API
    pub github_api_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();

        let api_psk = env::var("PAGESYNC_API_PSK").ok().filter(|s| !s.is_empty());

        let db_path = env::var("PAGESYNC_DB_PATH")
            .unwrap_or_else(|_| "./data/pagesync.sqlite".to_string())
            .into();

        let bind_addr = env::var("PAGESYNC_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let bind_addr = bind_addr
            .parse()
            .map_err(|e| format!("Invalid PAGESYNC_BIND_ADDR '{}': {}", bind_addr, e))?;

        let log_level = env::var("PAGESYNC_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let github_api_url = env::var("PAGESYNC_GITHUB_API_URL")
            .unwrap_or_else(|_| DEFAULT_GITHUB_API_URL.to_string());
        url::Url::parse(&github_api_url)
            .map_err(|e| format!("Invalid PAGESYNC_GITHUB_API_URL '{}': {}", github_api_url, e))?;

        Ok(Self {
            api_psk,
            db_path,
            bind_addr,
            log_level,
            github_api_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("PAGESYNC_API_PSK");
        env::remove_var("PAGESYNC_DB_PATH");
        env::remove_var("PAGESYNC_BIND_ADDR");
        env::remove_var("PAGESYNC_LOG_LEVEL");
        env::remove_var("PAGESYNC_GITHUB_API_URL");

        let config = Config::from_env().unwrap();

        assert!(config.api_psk.is_none());
        assert_eq!(config.db_path, PathBuf::from("./data/pagesync.sqlite"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.github_api_url, DEFAULT_GITHUB_API_URL);
    }
}
