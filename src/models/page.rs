//! Tracked page model.

use serde::{Deserialize, Serialize};

/// A user-registered URL slated for snapshot-and-commit into the repository.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackedPage {
    pub id: String,
    pub url: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_name: Option<String>,
    /// Destination inside the repository; derived on demand when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_synced_at: Option<String>,
    pub created_at: String,
}

impl TrackedPage {
    /// The repository path this page is written to.
    pub fn resolved_path(&self) -> String {
        match &self.repo_file_path {
            Some(path) => path.clone(),
            None => html_path(self.folder_path.as_deref(), &self.name),
        }
    }
}

/// `{folder}/{name}.html`, or `{name}.html` without a folder.
pub fn html_path(folder_path: Option<&str>, name: &str) -> String {
    match folder_path {
        Some(folder) if !folder.is_empty() => format!("{}/{}.html", folder, name),
        _ => format!("{}.html", name),
    }
}

/// A relative repository path whose every segment names a real entry: no empty, `.` or
/// `..` segments.
pub fn is_clean_repo_path(path: &str) -> bool {
    !path.is_empty()
        && path
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
}

/// Row data for inserting a tracked page.
#[derive(Debug, Clone, Default)]
pub struct NewTrackedPage {
    pub url: String,
    pub name: String,
    pub folder: Option<Folder>,
    pub repo_file_path: Option<String>,
}

/// An output subdirectory grouping within the repository.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub name: String,
    pub path: String,
}

/// How a manually added page maps onto the repository.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PageMode {
    /// Create a new `{name}.html`, optionally inside a folder
    #[default]
    New,
    /// Link to a file that already exists in the repository
    Existing,
}

/// Request body for adding a page manually.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePageRequest {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub mode: PageMode,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub folder: Option<Folder>,
    #[serde(default)]
    pub repo_file_path: Option<String>,
}
