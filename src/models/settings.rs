//! Stored GitHub credentials and the sitemap URL setting.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// GitHub configuration row as stored. Never serialized: the token stays server-side.
#[derive(Debug, Clone, Default)]
pub struct GitHubSettings {
    pub token: String,
    pub owner: String,
    pub repo: String,
    /// Empty means "the repository's default branch"
    pub branch: String,
    pub updated_at: Option<String>,
}

impl GitHubSettings {
    /// Coordinates for GitHub calls, or a validation error naming what is missing.
    pub fn coordinates(&self) -> Result<RepoCoordinates, AppError> {
        let mut missing = Vec::new();
        if self.token.trim().is_empty() {
            missing.push("token");
        }
        if self.owner.trim().is_empty() {
            missing.push("owner");
        }
        if self.repo.trim().is_empty() {
            missing.push("repository");
        }
        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "GitHub configuration incomplete: missing {}",
                missing.join(", ")
            )));
        }

        let branch = self.branch.trim();
        Ok(RepoCoordinates {
            owner: self.owner.trim().to_string(),
            repo: self.repo.trim().to_string(),
            token: self.token.trim().to_string(),
            branch: (!branch.is_empty()).then(|| branch.to_string()),
        })
    }

    pub fn view(&self) -> GitHubConfigView {
        GitHubConfigView {
            owner: self.owner.clone(),
            repo: self.repo.clone(),
            branch: self.branch.clone(),
            has_token: !self.token.is_empty(),
            updated_at: self.updated_at.clone(),
        }
    }
}

/// Which repository to talk to, and as whom.
#[derive(Clone)]
pub struct RepoCoordinates {
    pub owner: String,
    pub repo: String,
    pub token: String,
    pub branch: Option<String>,
}

impl std::fmt::Debug for RepoCoordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepoCoordinates")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("token", &"<redacted>")
            .field("branch", &self.branch)
            .finish()
    }
}

/// GitHub configuration as shown to the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitHubConfigView {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub has_token: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Request body for saving the GitHub configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveGitHubConfigRequest {
    /// Absent or empty keeps the stored token
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub repo: String,
    #[serde(default)]
    pub branch: Option<String>,
}

/// The sitemap URL setting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapSetting {
    pub sitemap_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Request body for saving the sitemap URL.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSitemapRequest {
    #[serde(default)]
    pub sitemap_url: String,
}
