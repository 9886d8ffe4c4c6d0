//! GitHub REST client.
//!
//! Covers the four calls the dashboard needs: repository metadata, branch lookup,
//! recursive tree listing, and contents create/update. The token is passed through as a
//! bearer credential and never inspected.

mod contents;
mod folders;
mod tree;

pub use folders::build_folder_tree;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use url::Url;

use crate::config::GITHUB_USER_AGENT;
use crate::errors::AppError;
use crate::models::RepoCoordinates;

const ACCEPT: &str = "application/vnd.github.v3+json";

/// Client for the GitHub REST API rooted at a configurable base URL.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct UpstreamError {
    #[serde(default)]
    message: Option<String>,
}

impl GitHubClient {
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::Internal(format!("Invalid GitHub API URL: {}", e)))?;
        let http = Client::builder()
            .user_agent(GITHUB_USER_AGENT)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { http, base_url })
    }

    /// `{base}/repos/{owner}/{repo}/{rest...}`, each segment percent-encoded.
    fn repo_url<'a>(
        &self,
        coords: &RepoCoordinates,
        rest: impl IntoIterator<Item = &'a str>,
    ) -> Result<Url, AppError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Internal("GitHub API URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["repos", coords.owner.as_str(), coords.repo.as_str()])
            .extend(rest);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, coords: &RepoCoordinates) -> RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(&coords.token)
            .header(reqwest::header::ACCEPT, ACCEPT)
    }
}

/// The `message` field of a GitHub error body, or the status reason.
async fn upstream_message(response: Response) -> String {
    let status = response.status();
    let fallback = status
        .canonical_reason()
        .unwrap_or(status.as_str())
        .to_string();
    match response.json::<UpstreamError>().await {
        Ok(UpstreamError {
            message: Some(message),
        }) if !message.is_empty() => message,
        _ => fallback,
    }
}

fn transport_error(what: &str, err: reqwest::Error) -> AppError {
    tracing::warn!("GitHub request for {} failed: {}", what, err);
    AppError::GitHub {
        status: None,
        message: format!("Failed to reach GitHub ({}): {}", what, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords() -> RepoCoordinates {
        RepoCoordinates {
            owner: "acme".to_string(),
            repo: "site".to_string(),
            token: "t".to_string(),
            branch: None,
        }
    }

    #[test]
    fn test_repo_url_encodes_segments() {
        let client = GitHubClient::new("https://api.github.com").unwrap();
        let url = client
            .repo_url(&coords(), ["contents", "docs", "my page.html"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/acme/site/contents/docs/my%20page.html"
        );
    }

    #[test]
    fn test_repo_url_keeps_base_path() {
        let client = GitHubClient::new("https://ghe.example.com/api/v3/").unwrap();
        let url = client.repo_url(&coords(), ["branches", "main"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://ghe.example.com/api/v3/repos/acme/site/branches/main"
        );
    }
}
