//! REST API module.
//!
//! Handlers for the dashboard. Every response carries the store revision so the browser
//! can tell when its snapshot is stale.

mod config;
mod dashboard;
mod fetch;
mod pages;
mod repository;
mod sitemap;
mod sync;

pub use config::*;
pub use dashboard::*;
pub use fetch::*;
pub use pages::*;
pub use repository::*;
pub use sitemap::*;
pub use sync::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::RepoCoordinates;
use crate::AppState;

/// Success response envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub revision_id: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T, revision_id: i64) -> Self {
        Self {
            success: true,
            data,
            revision_id,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, crate::errors::AppErrorWithRevision>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T, revision_id: i64) -> ApiResult<T> {
    Ok(ApiResponse::new(data, revision_id))
}

/// Create an error API response.
pub fn error<T: Serialize>(err: AppError, revision_id: i64) -> ApiResult<T> {
    Err(crate::errors::AppErrorWithRevision {
        error: err,
        revision_id,
    })
}

/// Coordinates from the stored GitHub configuration; `Validation` when incomplete.
async fn stored_coordinates(state: &AppState) -> Result<RepoCoordinates, AppError> {
    state.repo.get_github_settings().await?.coordinates()
}
