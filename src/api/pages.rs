//! Tracked page endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{error, stored_coordinates, success, ApiResult};
use crate::errors::AppError;
use crate::fetch::parse_fetchable_url;
use crate::models::{
    html_path, is_clean_repo_path, CreatePageRequest, Folder, NewTrackedPage, PageMode,
    TrackedPage,
};
use crate::sync::Syncer;
use crate::AppState;

/// GET /api/pages - List tracked pages in insertion order.
pub async fn list_pages(State(state): State<AppState>) -> ApiResult<Vec<TrackedPage>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_pages().await {
        Ok(pages) => success(pages, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/pages - Add a page manually.
pub async fn create_page(
    State(state): State<AppState>,
    Json(request): Json<CreatePageRequest>,
) -> ApiResult<TrackedPage> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let new_page = match new_page_from_request(request) {
        Ok(page) => page,
        Err(e) => return error(e, revision_id),
    };

    match state.repo.create_page(&new_page).await {
        Ok(page) => {
            tracing::info!("Tracking {} as {}", page.url, page.resolved_path());
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(page, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/pages/{id} - Stop tracking a page. The repository file is left alone.
pub async fn delete_page(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.delete_page(&id).await {
        Ok(()) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success((), new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/pages/{id}/sync - Fetch and commit a single page.
pub async fn sync_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<TrackedPage> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match sync_one(&state, &id).await {
        Ok(page) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(page, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

async fn sync_one(state: &AppState, id: &str) -> Result<TrackedPage, AppError> {
    let page = state
        .repo
        .get_page(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Page {} not found", id)))?;
    let coords = stored_coordinates(state).await?;

    let syncer = Syncer::new(&state.repo, &state.fetcher, &state.github, coords);
    let (updated, _) = syncer.sync_page(&page).await?;
    Ok(updated)
}

/// Validate a manual add and work out where the page lands in the repository.
fn new_page_from_request(request: CreatePageRequest) -> Result<NewTrackedPage, AppError> {
    let url = request.url.trim();
    if url.is_empty() {
        return Err(AppError::Validation(
            "Please provide a URL for the page".to_string(),
        ));
    }
    parse_fetchable_url(url, "page URL")?;

    match request.mode {
        PageMode::New => {
            let name = request.name.as_deref().map(str::trim).unwrap_or("");
            if name.is_empty() {
                return Err(AppError::Validation(
                    "Please provide a name for the page".to_string(),
                ));
            }
            if name.contains('/') || !is_clean_repo_path(name) {
                return Err(AppError::Validation(format!(
                    "Invalid page name '{}': use a folder for subdirectories",
                    name
                )));
            }

            let folder = match request.folder {
                Some(folder) => {
                    let path = folder.path.trim().trim_matches('/');
                    let folder_name = folder.name.trim();
                    if path.is_empty() || folder_name.is_empty() {
                        return Err(AppError::Validation(
                            "Folder name and path are required".to_string(),
                        ));
                    }
                    if !is_clean_repo_path(path) {
                        return Err(AppError::Validation(format!("Invalid folder path '{}'", path)));
                    }
                    Some(Folder {
                        name: folder_name.to_string(),
                        path: path.to_string(),
                    })
                }
                None => None,
            };

            let repo_file_path = html_path(folder.as_ref().map(|f| f.path.as_str()), name);
            Ok(NewTrackedPage {
                url: url.to_string(),
                name: name.to_string(),
                repo_file_path: Some(repo_file_path),
                folder,
            })
        }
        PageMode::Existing => {
            let path = request
                .repo_file_path
                .as_deref()
                .map(|p| p.trim().trim_start_matches('/'))
                .unwrap_or("");
            if path.is_empty() {
                return Err(AppError::Validation(
                    "Please select an existing file".to_string(),
                ));
            }
            let invalid_path =
                || AppError::Validation(format!("Invalid repository file path '{}'", path));
            if !is_clean_repo_path(path) {
                return Err(invalid_path());
            }

            let (folder_path, file_name) = match path.rsplit_once('/') {
                Some((folder_path, file_name)) => (Some(folder_path), file_name),
                None => (None, path),
            };
            let name = file_name.strip_suffix(".html").unwrap_or(file_name);
            if name.is_empty() {
                return Err(invalid_path());
            }
            let folder = folder_path.map(|folder_path| Folder {
                name: folder_path
                    .rsplit('/')
                    .next()
                    .unwrap_or(folder_path)
                    .to_string(),
                path: folder_path.to_string(),
            });

            Ok(NewTrackedPage {
                url: url.to_string(),
                name: name.to_string(),
                folder,
                repo_file_path: Some(path.to_string()),
            })
        }
    }
}
