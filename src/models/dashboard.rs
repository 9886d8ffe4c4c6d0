//! Dashboard snapshot returned to the browser on load.

use serde::{Deserialize, Serialize};

use super::{Folder, GitHubConfigView, SitemapSetting, TrackedPage};

/// Everything the dashboard renders, in one response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub schema_version: i32,
    pub generated_at: String,
    pub revision_id: i64,
    pub github: GitHubConfigView,
    pub sitemap: SitemapSetting,
    pub pages: Vec<TrackedPage>,
    pub folders: Vec<Folder>,
}

/// Revision information for change detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionInfo {
    pub revision_id: i64,
    pub generated_at: String,
}
