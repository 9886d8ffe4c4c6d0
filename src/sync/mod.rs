//! Reconciliation and sync loop.
//!
//! Reconciliation turns sitemap candidates into tracked pages, linking to files already in
//! the repository. Sync fetches each tracked page and commits it, strictly one page at a
//! time so writes to the branch never race each other.

use std::collections::HashSet;

use crate::db::{timestamp_now, Repository};
use crate::errors::{AppError, ErrorDetails};
use crate::fetch::PageFetcher;
use crate::github::GitHubClient;
use crate::models::{
    CandidatePage, Folder, NewTrackedPage, PageSyncResult, PageSyncStatus, RepoCoordinates,
    ScanOutcome, ScanReport, ScanStatus, SyncReport, TrackedPage, WriteOutcome,
};
use crate::sitemap;

/// Repository files known from a tree snapshot.
#[derive(Debug, Default)]
pub struct RepoFiles {
    pub paths: HashSet<String>,
    /// False when no snapshot could be taken
    pub checked: bool,
    pub truncated: bool,
}

/// Record each candidate as `exists`, `added` or `error`, in input order.
///
/// A URL already tracked (or added earlier in this batch) is left alone. A new row links
/// to `file_path` when the repository already has that file; otherwise the path is left
/// unset and the first sync creates it. A failed insert only affects its own candidate.
pub async fn reconcile(
    repo: &Repository,
    candidates: &[CandidatePage],
    repo_files: &HashSet<String>,
) -> Result<Vec<ScanOutcome>, AppError> {
    let mut known_urls: HashSet<String> = repo
        .list_pages()
        .await?
        .into_iter()
        .map(|p| p.url)
        .collect();

    let mut outcomes = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if known_urls.contains(&candidate.url) {
            outcomes.push(ScanOutcome {
                page: candidate.clone(),
                status: ScanStatus::Exists,
                message: "Already in sync list".to_string(),
                linked_existing: false,
            });
            continue;
        }

        let in_repo = repo_files.contains(&candidate.file_path);
        let row = NewTrackedPage {
            url: candidate.url.clone(),
            name: candidate.name.clone(),
            folder: match (&candidate.folder_path, &candidate.folder_name) {
                (Some(path), Some(name)) => Some(Folder {
                    name: name.clone(),
                    path: path.clone(),
                }),
                _ => None,
            },
            repo_file_path: in_repo.then(|| candidate.file_path.clone()),
        };

        match repo.create_page(&row).await {
            Ok(_) => {
                known_urls.insert(candidate.url.clone());
                outcomes.push(ScanOutcome {
                    page: candidate.clone(),
                    status: ScanStatus::Added,
                    message: if in_repo {
                        "Linked to existing file".to_string()
                    } else {
                        "Will create new file on sync".to_string()
                    },
                    linked_existing: in_repo,
                });
            }
            Err(e) => {
                tracing::warn!("Failed to add page {}: {}", candidate.url, e);
                outcomes.push(ScanOutcome {
                    page: candidate.clone(),
                    status: ScanStatus::Error,
                    message: e.message(),
                    linked_existing: false,
                });
            }
        }
    }

    Ok(outcomes)
}

/// Take a tree snapshot for existence checks. Missing configuration or a failed listing
/// yields an unchecked, empty set instead of failing the scan.
pub async fn snapshot_repo_files(
    github: &GitHubClient,
    coords: Result<RepoCoordinates, AppError>,
) -> RepoFiles {
    let coords = match coords {
        Ok(coords) => coords,
        Err(e) => {
            tracing::warn!("Skipping repository file check: {}", e.message());
            return RepoFiles::default();
        }
    };

    match github.get_tree(&coords, None).await {
        Ok(tree) => RepoFiles {
            paths: tree.file_paths().map(str::to_string).collect(),
            checked: true,
            truncated: tree.truncated,
        },
        Err(e) => {
            tracing::warn!("Repository tree unavailable, skipping file check: {}", e);
            RepoFiles::default()
        }
    }
}

/// Parse the sitemap, snapshot the repository, and reconcile.
pub async fn scan_sitemap(
    repo: &Repository,
    fetcher: &PageFetcher,
    github: &GitHubClient,
    sitemap_url: &str,
) -> Result<ScanReport, AppError> {
    let parsed = sitemap::parse_sitemap(fetcher, sitemap_url).await?;

    let coords = repo.get_github_settings().await?.coordinates();
    let files = snapshot_repo_files(github, coords).await;

    let outcomes = reconcile(repo, &parsed.pages, &files.paths).await?;
    let report = ScanReport::new(
        sitemap_url.to_string(),
        parsed.total_urls,
        files.checked,
        files.truncated,
        outcomes,
    );

    tracing::info!(
        "Sitemap scan complete: {} added, {} existed, {} errors",
        report.added,
        report.exists,
        report.errors
    );
    Ok(report)
}

/// Drives fetch-then-commit for tracked pages.
pub struct Syncer<'a> {
    repo: &'a Repository,
    fetcher: &'a PageFetcher,
    github: &'a GitHubClient,
    coords: RepoCoordinates,
}

impl<'a> Syncer<'a> {
    pub fn new(
        repo: &'a Repository,
        fetcher: &'a PageFetcher,
        github: &'a GitHubClient,
        coords: RepoCoordinates,
    ) -> Self {
        Self {
            repo,
            fetcher,
            github,
            coords,
        }
    }

    /// Fetch one page, commit it to its resolved path, and stamp `last_synced_at`.
    pub async fn sync_page(
        &self,
        page: &TrackedPage,
    ) -> Result<(TrackedPage, WriteOutcome), AppError> {
        let content = self.fetcher.fetch(&page.url).await?;

        let path = page.resolved_path();
        let message = format!("Sync {} from {}", page.name, page.url);
        let outcome = self
            .github
            .write_file(&self.coords, &path, &content, Some(&message))
            .await?;

        let updated = self.repo.mark_synced(&page.id, &timestamp_now()).await?;
        Ok((updated, outcome))
    }

    /// Sync pages in order. Unless `continue_on_error` is set, the first failure stops the
    /// batch and the remaining pages are reported as skipped without being attempted.
    pub async fn sync_all(&self, pages: &[TrackedPage], continue_on_error: bool) -> SyncReport {
        let mut results = Vec::with_capacity(pages.len());
        let mut stopped = false;

        for page in pages {
            let repo_file_path = page.resolved_path();

            if stopped {
                results.push(PageSyncResult {
                    page_id: page.id.clone(),
                    url: page.url.clone(),
                    repo_file_path,
                    status: PageSyncStatus::Skipped,
                    error: None,
                    commit_sha: None,
                });
                continue;
            }

            match self.sync_page(page).await {
                Ok((_, outcome)) => results.push(PageSyncResult {
                    page_id: page.id.clone(),
                    url: page.url.clone(),
                    repo_file_path,
                    status: PageSyncStatus::Synced,
                    error: None,
                    commit_sha: outcome.commit_sha,
                }),
                Err(e) => {
                    tracing::warn!("Sync of {} failed: {}", page.url, e);
                    results.push(PageSyncResult {
                        page_id: page.id.clone(),
                        url: page.url.clone(),
                        repo_file_path,
                        status: PageSyncStatus::Failed,
                        error: Some(ErrorDetails::from(&e)),
                        commit_sha: None,
                    });
                    stopped = !continue_on_error;
                }
            }
        }

        let report = SyncReport::from_results(results);
        tracing::info!(
            "Sync finished: {} synced, {} failed, {} skipped",
            report.synced,
            report.failed,
            report.skipped
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use crate::sitemap::derive_candidate;
    use tempfile::TempDir;

    async fn repo() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let pool = init_database(&temp_dir.path().join("test.sqlite"))
            .await
            .expect("Failed to init DB");
        (Repository::new(pool), temp_dir)
    }

    fn candidates(urls: &[&str]) -> Vec<CandidatePage> {
        urls.iter().filter_map(|u| derive_candidate(u)).collect()
    }

    #[tokio::test]
    async fn test_reconcile_links_existing_files() {
        let (repo, _dir) = repo().await;
        let files: HashSet<String> = ["gallery/lumora-25.html".to_string()].into();

        let outcomes = reconcile(
            &repo,
            &candidates(&[
                "https://x.com/gallery/lumora-25",
                "https://x.com/about",
            ]),
            &files,
        )
        .await
        .unwrap();

        assert_eq!(outcomes[0].status, ScanStatus::Added);
        assert!(outcomes[0].linked_existing);
        assert_eq!(outcomes[0].message, "Linked to existing file");
        assert_eq!(outcomes[1].message, "Will create new file on sync");

        let pages = repo.list_pages().await.unwrap();
        assert_eq!(pages[0].repo_file_path.as_deref(), Some("gallery/lumora-25.html"));
        assert_eq!(pages[0].folder_name.as_deref(), Some("gallery"));
        assert_eq!(pages[1].repo_file_path, None);
        assert_eq!(pages[1].resolved_path(), "about.html");
    }

    #[tokio::test]
    async fn test_reconcile_is_idempotent() {
        let (repo, _dir) = repo().await;
        let batch = candidates(&["https://x.com/a", "https://x.com/b"]);

        reconcile(&repo, &batch, &HashSet::new()).await.unwrap();
        let second = reconcile(&repo, &batch, &HashSet::new()).await.unwrap();

        assert!(second.iter().all(|o| o.status == ScanStatus::Exists));
        assert!(second.iter().all(|o| o.message == "Already in sync list"));
        assert_eq!(repo.list_pages().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_reconcile_dedupes_within_batch() {
        let (repo, _dir) = repo().await;
        let batch = candidates(&["https://x.com/a", "https://x.com/a"]);

        let outcomes = reconcile(&repo, &batch, &HashSet::new()).await.unwrap();

        assert_eq!(outcomes[0].status, ScanStatus::Added);
        assert_eq!(outcomes[1].status, ScanStatus::Exists);
        assert_eq!(repo.list_pages().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_snapshot_without_config_is_unchecked() {
        let github = GitHubClient::new("http://127.0.0.1:9").unwrap();
        let files = snapshot_repo_files(
            &github,
            Err(AppError::Validation("GitHub configuration incomplete".to_string())),
        )
        .await;

        assert!(!files.checked);
        assert!(files.paths.is_empty());
    }
}
