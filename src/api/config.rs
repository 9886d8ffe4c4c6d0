//! GitHub and sitemap configuration endpoints.

use axum::{extract::State, Json};

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::fetch::parse_fetchable_url;
use crate::models::{GitHubConfigView, SaveGitHubConfigRequest, SaveSitemapRequest, SitemapSetting};
use crate::AppState;

/// GET /api/config/github - Stored GitHub configuration, without the token.
pub async fn get_github_config(State(state): State<AppState>) -> ApiResult<GitHubConfigView> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_github_settings().await {
        Ok(settings) => success(settings.view(), revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/config/github - Save the GitHub configuration.
pub async fn save_github_config(
    State(state): State<AppState>,
    Json(request): Json<SaveGitHubConfigRequest>,
) -> ApiResult<GitHubConfigView> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if request.owner.trim().is_empty() {
        return error(
            AppError::Validation("Repository owner is required".to_string()),
            revision_id,
        );
    }
    if request.repo.trim().is_empty() {
        return error(
            AppError::Validation("Repository name is required".to_string()),
            revision_id,
        );
    }

    match state.repo.save_github_settings(&request).await {
        Ok(settings) => {
            tracing::info!(
                "GitHub configuration saved for {}/{}",
                settings.owner,
                settings.repo
            );
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(settings.view(), new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/config/sitemap - Stored sitemap URL.
pub async fn get_sitemap_config(State(state): State<AppState>) -> ApiResult<SitemapSetting> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_sitemap_setting().await {
        Ok(setting) => success(setting, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/config/sitemap - Save the sitemap URL.
pub async fn save_sitemap_config(
    State(state): State<AppState>,
    Json(request): Json<SaveSitemapRequest>,
) -> ApiResult<SitemapSetting> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if let Err(e) = parse_fetchable_url(&request.sitemap_url, "Sitemap URL") {
        return error(e, revision_id);
    }

    match state.repo.save_sitemap_url(request.sitemap_url.trim()).await {
        Ok(setting) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(setting, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
