//! Sync requests and reports.

use serde::{Deserialize, Serialize};

use crate::errors::ErrorDetails;

/// Request body for syncing all tracked pages.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    /// Keep going after a page fails instead of stopping the batch
    #[serde(default)]
    pub continue_on_error: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PageSyncStatus {
    Synced,
    Failed,
    /// Not attempted because an earlier page stopped the batch
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSyncResult {
    pub page_id: String,
    pub url: String,
    pub repo_file_path: String,
    pub status: PageSyncStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_sha: Option<String>,
}

/// Aggregate result of a sync run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// Every page synced
    pub completed: bool,
    /// A failure stopped the batch before every page was attempted
    pub aborted: bool,
    pub total: usize,
    pub synced: usize,
    pub failed: usize,
    pub skipped: usize,
    pub results: Vec<PageSyncResult>,
}

impl SyncReport {
    pub fn from_results(results: Vec<PageSyncResult>) -> Self {
        let count = |status| results.iter().filter(|r| r.status == status).count();
        let synced = count(PageSyncStatus::Synced);
        let failed = count(PageSyncStatus::Failed);
        let skipped = count(PageSyncStatus::Skipped);
        Self {
            completed: synced == results.len(),
            aborted: skipped > 0,
            total: results.len(),
            synced,
            failed,
            skipped,
            results,
        }
    }
}

/// Outcome of one contents write.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteOutcome {
    pub committed: bool,
    /// No prior file existed at the path
    pub created: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_sha: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_sha: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchPageRequest {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchPageResponse {
    pub url: String,
    pub content: String,
}
