//! PageSync Backend
//!
//! REST backend for a dashboard that snapshots web pages and commits them into a GitHub
//! repository. SQLite holds the configuration and the tracked pages.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod fetch;
mod github;
mod models;
mod sitemap;
mod sync;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;
use fetch::PageFetcher;
use github::GitHubClient;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub fetcher: Arc<PageFetcher>,
    pub github: Arc<GitHubClient>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting PageSync Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("GitHub API: {}", config.github_api_url);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (PAGESYNC_API_PSK). Authentication is disabled!");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    let tracked = repo.list_pages().await?.len();
    tracing::info!("Loaded {} tracked pages", tracked);

    let state = AppState {
        repo,
        fetcher: Arc::new(PageFetcher::new()?),
        github: Arc::new(GitHubClient::new(&config.github_api_url)?),
        config: Arc::new(config.clone()),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let psk = state.config.api_psk.clone();

    let api_routes = Router::new()
        // Dashboard
        .route("/dashboard", get(api::get_dashboard))
        .route("/dashboard/revision", get(api::get_revision))
        .route("/folders", get(api::list_folders))
        // Configuration
        .route(
            "/config/github",
            get(api::get_github_config).put(api::save_github_config),
        )
        .route(
            "/config/sitemap",
            get(api::get_sitemap_config).put(api::save_sitemap_config),
        )
        // Sitemap
        .route("/sitemap/parse", post(api::parse_sitemap))
        .route("/sitemap/scan", post(api::scan_sitemap))
        // Pages
        .route("/pages", get(api::list_pages).post(api::create_page))
        .route("/pages/{id}", delete(api::delete_page))
        .route("/pages/{id}/sync", post(api::sync_page))
        .route("/sync", post(api::sync_all_pages))
        .route("/fetch-page", post(api::fetch_page))
        // Repository
        .route("/repository/tree", get(api::get_repository_tree))
        .route("/repository/folders", get(api::get_repository_folders))
        // Apply PSK auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
