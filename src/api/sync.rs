//! Bulk sync endpoint.

use axum::{body::Bytes, extract::State};

use super::{error, stored_coordinates, success, ApiResult};
use crate::errors::AppError;
use crate::models::{SyncReport, SyncRequest};
use crate::sync::Syncer;
use crate::AppState;

/// POST /api/sync - Sync every tracked page, one at a time, in stored order.
///
/// The body is optional; `{"continueOnError": true}` keeps going past failed pages.
pub async fn sync_all_pages(State(state): State<AppState>, body: Bytes) -> ApiResult<SyncReport> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match sync_all(&state, &body).await {
        Ok(report) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(report, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

async fn sync_all(state: &AppState, body: &[u8]) -> Result<SyncReport, AppError> {
    let request: SyncRequest = if body.iter().all(u8::is_ascii_whitespace) {
        SyncRequest::default()
    } else {
        serde_json::from_slice(body)?
    };

    // Configuration is checked before any page is fetched
    let coords = stored_coordinates(state).await?;
    let pages = state.repo.list_pages().await?;
    tracing::info!("Syncing {} pages", pages.len());

    let syncer = Syncer::new(&state.repo, &state.fetcher, &state.github, coords);
    Ok(syncer.sync_all(&pages, request.continue_on_error).await)
}
