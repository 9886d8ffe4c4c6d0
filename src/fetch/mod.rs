//! Remote page fetcher.
//!
//! One GET per call with a fixed User-Agent. No retries; redirects are whatever reqwest
//! follows by default.

use reqwest::Client;
use url::Url;

use crate::config::PAGE_USER_AGENT;
use crate::errors::AppError;

/// Validate user input as a fetchable absolute URL, before any network access.
pub fn parse_fetchable_url(raw: &str, field: &str) -> Result<Url, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    let url = Url::parse(raw)
        .map_err(|e| AppError::InvalidUrl(format!("Invalid {} format: {}", field, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AppError::InvalidUrl(format!(
            "Invalid {} format: unsupported scheme '{}'",
            field, other
        ))),
    }
}

/// Fetches raw page and sitemap bodies from arbitrary origins.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new() -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(PAGE_USER_AGENT)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Fetch a page's HTML.
    pub async fn fetch(&self, url: &str) -> Result<String, AppError> {
        self.fetch_text(url, "page").await
    }

    /// Fetch a body as text; `what` names the resource in error messages.
    pub async fn fetch_text(&self, url: &str, what: &str) -> Result<String, AppError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            tracing::warn!("Failed to fetch {} {}: {}", what, url, e);
            AppError::UpstreamFetch {
                status: None,
                message: format!("Failed to fetch {}: {}", what, e),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Fetching {} {} returned {}", what, url, status);
            return Err(AppError::UpstreamFetch {
                status: Some(status.as_u16()),
                message: format!(
                    "Failed to fetch {}: {}",
                    what,
                    status.canonical_reason().unwrap_or(status.as_str())
                ),
            });
        }

        response.text().await.map_err(|e| AppError::UpstreamFetch {
            status: Some(status.as_u16()),
            message: format!("Failed to read {} body: {}", what, e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fetchable_url() {
        assert!(parse_fetchable_url("https://x.com/sitemap.xml", "Sitemap URL").is_ok());
        assert!(matches!(
            parse_fetchable_url("   ", "Sitemap URL"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            parse_fetchable_url("not a url", "Sitemap URL"),
            Err(AppError::InvalidUrl(_))
        ));
        assert!(matches!(
            parse_fetchable_url("ftp://x.com/a", "URL"),
            Err(AppError::InvalidUrl(_))
        ));
    }
}
