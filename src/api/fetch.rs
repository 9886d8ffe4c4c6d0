//! Page preview endpoint.

use axum::{extract::State, Json};

use super::{error, success, ApiResult};
use crate::fetch::parse_fetchable_url;
use crate::models::{FetchPageRequest, FetchPageResponse};
use crate::AppState;

/// POST /api/fetch-page - Fetch a page's raw HTML without storing anything.
pub async fn fetch_page(
    State(state): State<AppState>,
    Json(request): Json<FetchPageRequest>,
) -> ApiResult<FetchPageResponse> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let url = match parse_fetchable_url(&request.url, "URL") {
        Ok(url) => url,
        Err(e) => return error(e, revision_id),
    };

    match state.fetcher.fetch(url.as_str()).await {
        Ok(content) => success(
            FetchPageResponse {
                url: url.to_string(),
                content,
            },
            revision_id,
        ),
        Err(e) => error(e, revision_id),
    }
}
