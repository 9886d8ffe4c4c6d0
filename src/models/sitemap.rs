//! Sitemap candidates and scan reports.

use serde::{Deserialize, Serialize};

/// A page discovered in a sitemap, not yet persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CandidatePage {
    pub url: String,
    pub name: String,
    pub folder_path: Option<String>,
    pub folder_name: Option<String>,
    pub file_path: String,
    pub file_extension: String,
}

/// Result of parsing a sitemap document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedSitemap {
    pub pages: Vec<CandidatePage>,
    /// Number of `<loc>` entries found, including ones dropped as invalid URLs
    pub total_urls: usize,
}

/// Request body for parsing or scanning a sitemap.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapRequest {
    #[serde(default)]
    pub sitemap_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Added,
    Exists,
    Error,
}

/// What happened to one candidate during reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanOutcome {
    pub page: CandidatePage,
    pub status: ScanStatus,
    pub message: String,
    /// Set when the new row was linked to a file already in the repository
    #[serde(default)]
    pub linked_existing: bool,
}

/// Aggregate result of a sitemap scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub sitemap_url: String,
    pub total_urls: usize,
    pub added: usize,
    pub exists: usize,
    pub errors: usize,
    /// False when no tree snapshot was available to check existing files
    pub tree_checked: bool,
    /// The snapshot was truncated upstream, so "not in repository" may be wrong
    pub tree_truncated: bool,
    pub outcomes: Vec<ScanOutcome>,
}

impl ScanReport {
    pub fn new(
        sitemap_url: String,
        total_urls: usize,
        tree_checked: bool,
        tree_truncated: bool,
        outcomes: Vec<ScanOutcome>,
    ) -> Self {
        let count = |status| outcomes.iter().filter(|o| o.status == status).count();
        Self {
            sitemap_url,
            total_urls,
            added: count(ScanStatus::Added),
            exists: count(ScanStatus::Exists),
            errors: count(ScanStatus::Error),
            tree_checked,
            tree_truncated,
            outcomes,
        }
    }
}
