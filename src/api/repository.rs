//! Repository browsing endpoints.

use std::collections::HashSet;

use axum::extract::{Query, State};
use serde::Deserialize;

use super::{error, stored_coordinates, success, ApiResult};
use crate::errors::AppError;
use crate::github::build_folder_tree;
use crate::models::{FolderView, RepositoryTree};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct TreeQuery {
    #[serde(default)]
    pub branch: Option<String>,
}

/// GET /api/repository/tree - Flat recursive listing of the configured branch.
pub async fn get_repository_tree(
    State(state): State<AppState>,
    Query(query): Query<TreeQuery>,
) -> ApiResult<RepositoryTree> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match load_tree(&state, query.branch.as_deref()).await {
        Ok(tree) => success(tree, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/repository/folders - The tree regrouped by folder, tracked files marked.
pub async fn get_repository_folders(
    State(state): State<AppState>,
    Query(query): Query<TreeQuery>,
) -> ApiResult<FolderView> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match folder_view(&state, query.branch.as_deref()).await {
        Ok(view) => success(view, revision_id),
        Err(e) => error(e, revision_id),
    }
}

async fn load_tree(state: &AppState, branch: Option<&str>) -> Result<RepositoryTree, AppError> {
    let coords = stored_coordinates(state).await?;
    state.github.get_tree(&coords, branch).await
}

async fn folder_view(state: &AppState, branch: Option<&str>) -> Result<FolderView, AppError> {
    let tree = load_tree(state, branch).await?;
    let tracked: HashSet<String> = state
        .repo
        .list_pages()
        .await?
        .iter()
        .map(|p| p.resolved_path())
        .collect();

    Ok(FolderView {
        folders: build_folder_tree(&tree.entries, &tracked),
        truncated: tree.truncated,
        branch: tree.branch,
    })
}
