//! Dashboard snapshot and revision endpoints.

use axum::extract::State;

use super::{error, success, ApiResult};
use crate::models::{Dashboard, Folder, RevisionInfo};
use crate::AppState;

/// GET /api/dashboard - Full dashboard snapshot.
pub async fn get_dashboard(State(state): State<AppState>) -> ApiResult<Dashboard> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_dashboard().await {
        Ok(dashboard) => {
            let rev = dashboard.revision_id;
            success(dashboard, rev)
        }
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/dashboard/revision - Current revision info.
pub async fn get_revision(State(state): State<AppState>) -> ApiResult<RevisionInfo> {
    match state.repo.get_revision_info().await {
        Ok(info) => {
            let rev = info.revision_id;
            success(info, rev)
        }
        Err(e) => error(e, 0),
    }
}

/// GET /api/folders - Folders used by tracked pages.
pub async fn list_folders(State(state): State<AppState>) -> ApiResult<Vec<Folder>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_folders().await {
        Ok(folders) => success(folders, revision_id),
        Err(e) => error(e, revision_id),
    }
}
