//! Repository writer: read-before-write, then create or update a single file.

use base64::Engine;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{transport_error, upstream_message, GitHubClient};
use crate::errors::{AppError, WriteFailure};
use crate::models::{is_clean_repo_path, RepoCoordinates, WriteOutcome};

#[derive(Debug, Deserialize)]
struct ExistingFile {
    sha: String,
}

/// Body of `PUT /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Serialize)]
struct PutContents<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
    /// Present only for updates; GitHub treats the field's presence as "update"
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Default, Deserialize)]
struct PutResult {
    #[serde(default)]
    content: Option<ShaOnly>,
    #[serde(default)]
    commit: Option<ShaOnly>,
}

#[derive(Debug, Deserialize)]
struct ShaOnly {
    sha: String,
}

impl GitHubClient {
    /// Create or update `path` on the configured branch.
    pub async fn write_file(
        &self,
        coords: &RepoCoordinates,
        path: &str,
        content: &str,
        message: Option<&str>,
    ) -> Result<WriteOutcome, AppError> {
        let path = path.trim().trim_start_matches('/');
        if path.is_empty() {
            return Err(AppError::Validation("File path is required".to_string()));
        }
        // The URL builder would silently collapse dot segments onto a different file
        if !is_clean_repo_path(path) {
            return Err(AppError::Validation(format!("Invalid file path '{}'", path)));
        }

        let prior_sha = self.existing_sha(coords, path).await;

        let default_message;
        let message = match message {
            Some(m) if !m.trim().is_empty() => m,
            _ => {
                default_message = format!("Update {}", path);
                &default_message
            }
        };
        let body = PutContents {
            message,
            content: base64::engine::general_purpose::STANDARD.encode(content),
            branch: coords.branch.as_deref(),
            sha: prior_sha.as_deref(),
        };

        let url = self.repo_url(coords, ["contents"].into_iter().chain(path.split('/')))?;
        let response = self
            .request(Method::PUT, url, coords)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error("contents write", e))?;

        let status = response.status();
        if !status.is_success() {
            let upstream = upstream_message(response).await;
            let failure = WriteFailure::from_status(status.as_u16());
            tracing::warn!("GitHub rejected write of {} ({}): {}", path, status, upstream);
            return Err(AppError::GitHubWrite {
                failure,
                status: status.as_u16(),
                message: write_failure_message(failure, &upstream),
            });
        }

        let result: PutResult = response.json().await.unwrap_or_default();
        tracing::info!(
            "{} {} in {}/{}",
            if prior_sha.is_some() { "Updated" } else { "Created" },
            path,
            coords.owner,
            coords.repo
        );

        Ok(WriteOutcome {
            committed: true,
            created: prior_sha.is_none(),
            content_sha: result.content.map(|c| c.sha),
            commit_sha: result.commit.map(|c| c.sha),
        })
    }

    /// The blob sha of an existing file. Any failure means "no prior file": a real
    /// problem resurfaces on the write itself.
    async fn existing_sha(&self, coords: &RepoCoordinates, path: &str) -> Option<String> {
        let mut url = self
            .repo_url(coords, ["contents"].into_iter().chain(path.split('/')))
            .ok()?;
        if let Some(branch) = &coords.branch {
            url.query_pairs_mut().append_pair("ref", branch);
        }

        let response = match self.request(Method::GET, url, coords).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("Existence check for {} failed: {}", path, e);
                return None;
            }
        };
        if !response.status().is_success() {
            tracing::debug!("No existing file at {} ({})", path, response.status());
            return None;
        }
        response.json::<ExistingFile>().await.ok().map(|f| f.sha)
    }
}

fn write_failure_message(failure: WriteFailure, upstream: &str) -> String {
    match failure {
        WriteFailure::InvalidCredential => {
            "Invalid GitHub token. Please check your token and try again.".to_string()
        }
        WriteFailure::InsufficientScope => concat!(
            "GitHub token doesn't have permission to write to this repository. ",
            "Please ensure your token has 'repo' scope (classic token) ",
            "or 'Contents' read/write permissions (fine-grained token)."
        )
        .to_string(),
        WriteFailure::NotFound => {
            "Repository not found. Please check the owner and repository name.".to_string()
        }
        WriteFailure::Upstream if upstream.is_empty() => "Failed to push to GitHub".to_string(),
        WriteFailure::Upstream => upstream.to_string(),
    }
}
