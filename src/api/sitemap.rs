//! Sitemap preview and scan endpoints.

use axum::{extract::State, Json};

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::fetch::parse_fetchable_url;
use crate::models::{ParsedSitemap, ScanReport, SitemapRequest};
use crate::{sitemap, sync, AppState};

/// POST /api/sitemap/parse - Parse a sitemap into candidates without storing anything.
pub async fn parse_sitemap(
    State(state): State<AppState>,
    Json(request): Json<SitemapRequest>,
) -> ApiResult<ParsedSitemap> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let sitemap_url = match resolve_sitemap_url(&state, request.sitemap_url).await {
        Ok(url) => url,
        Err(e) => return error(e, revision_id),
    };

    match sitemap::parse_sitemap(&state.fetcher, &sitemap_url).await {
        Ok(parsed) => success(parsed, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/sitemap/scan - Parse a sitemap and add unseen URLs to the sync list.
///
/// A URL in the request is saved as the sitemap setting before scanning.
pub async fn scan_sitemap(
    State(state): State<AppState>,
    Json(request): Json<SitemapRequest>,
) -> ApiResult<ScanReport> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match scan(&state, request).await {
        Ok(report) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(report, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

async fn scan(state: &AppState, request: SitemapRequest) -> Result<ScanReport, AppError> {
    let provided = request
        .sitemap_url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty());
    if let Some(url) = provided {
        parse_fetchable_url(url, "Sitemap URL")?;
        state.repo.save_sitemap_url(url).await?;
    }

    let sitemap_url = resolve_sitemap_url(state, request.sitemap_url).await?;
    sync::scan_sitemap(&state.repo, &state.fetcher, &state.github, &sitemap_url).await
}

/// The requested URL, else the stored one.
async fn resolve_sitemap_url(
    state: &AppState,
    requested: Option<String>,
) -> Result<String, AppError> {
    if let Some(url) = requested.filter(|u| !u.trim().is_empty()) {
        return Ok(url.trim().to_string());
    }
    state
        .repo
        .get_sitemap_setting()
        .await?
        .sitemap_url
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::Validation("Please provide a sitemap URL".to_string()))
}
