//! Repository tree reader: repository -> branch -> recursive tree.

use reqwest::Method;
use serde::Deserialize;

use super::{transport_error, upstream_message, GitHubClient};
use crate::errors::AppError;
use crate::models::{EntryKind, RepoCoordinates, RepositoryTree, RepositoryTreeEntry};

#[derive(Debug, Deserialize)]
struct RepoMetadata {
    default_branch: String,
}

#[derive(Debug, Deserialize)]
struct BranchInfo {
    commit: BranchCommit,
}

#[derive(Debug, Deserialize)]
struct BranchCommit {
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    tree: ShaRef,
}

#[derive(Debug, Deserialize)]
struct ShaRef {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct GitTree {
    tree: Vec<GitTreeItem>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct GitTreeItem {
    path: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    size: Option<u64>,
    sha: String,
}

impl From<GitTreeItem> for RepositoryTreeEntry {
    fn from(item: GitTreeItem) -> Self {
        let kind = EntryKind::from_git_type(&item.kind);
        RepositoryTreeEntry {
            path: item.path,
            kind,
            size: if kind == EntryKind::File { item.size } else { None },
            sha: item.sha,
        }
    }
}

impl GitHubClient {
    /// Fetch the full recursive listing of a branch.
    ///
    /// The branch is `branch_override`, else the configured branch, else the repository's
    /// default. A truncated listing is returned as-is with `truncated` set.
    pub async fn get_tree(
        &self,
        coords: &RepoCoordinates,
        branch_override: Option<&str>,
    ) -> Result<RepositoryTree, AppError> {
        let url = self.repo_url(coords, std::iter::empty::<&str>())?;
        let response = self
            .request(Method::GET, url, coords)
            .send()
            .await
            .map_err(|e| transport_error("repository", e))?;
        if !response.status().is_success() {
            let message = upstream_message(response).await;
            return Err(AppError::RepositoryNotFound(format!(
                "Repository not found: {}",
                message
            )));
        }
        let metadata: RepoMetadata = response.json().await.map_err(|e| AppError::GitHub {
            status: None,
            message: format!("Unexpected repository response: {}", e),
        })?;

        let branch = branch_override
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(str::to_string)
            .or_else(|| coords.branch.clone())
            .unwrap_or(metadata.default_branch);

        let url = self.repo_url(coords, ["branches", branch.as_str()])?;
        let response = self
            .request(Method::GET, url, coords)
            .send()
            .await
            .map_err(|e| transport_error("branch", e))?;
        if !response.status().is_success() {
            let message = upstream_message(response).await;
            return Err(AppError::BranchNotFound(format!(
                "Branch not found: {}",
                message
            )));
        }
        let info: BranchInfo = response.json().await.map_err(|e| AppError::GitHub {
            status: None,
            message: format!("Unexpected branch response: {}", e),
        })?;
        let tree_sha = info.commit.commit.tree.sha;

        let mut url = self.repo_url(coords, ["git", "trees", tree_sha.as_str()])?;
        url.query_pairs_mut().append_pair("recursive", "1");
        let response = self
            .request(Method::GET, url, coords)
            .send()
            .await
            .map_err(|e| transport_error("tree", e))?;
        let status = response.status();
        if !status.is_success() {
            let message = upstream_message(response).await;
            return Err(AppError::GitHub {
                status: Some(status.as_u16()),
                message: format!("Failed to fetch repository tree: {}", message),
            });
        }
        let tree: GitTree = response.json().await.map_err(|e| AppError::GitHub {
            status: None,
            message: format!("Unexpected tree response: {}", e),
        })?;

        if tree.truncated {
            tracing::warn!(
                "Tree for {}/{}@{} is truncated; existence checks may miss files",
                coords.owner,
                coords.repo,
                branch
            );
        }
        tracing::info!(
            "Fetched {} tree entries for {}/{}@{}",
            tree.tree.len(),
            coords.owner,
            coords.repo,
            branch
        );

        Ok(RepositoryTree {
            entries: tree.tree.into_iter().map(RepositoryTreeEntry::from).collect(),
            truncated: tree.truncated,
            branch,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_item_size_only_for_files() {
        let items: Vec<GitTreeItem> = serde_json::from_str(
            r#"[
                {"path": "docs", "mode": "040000", "type": "tree", "sha": "d1", "size": 12},
                {"path": "docs/a.html", "mode": "100644", "type": "blob", "sha": "f1", "size": 42},
                {"path": "vendor/lib", "mode": "160000", "type": "commit", "sha": "c1"}
            ]"#,
        )
        .unwrap();

        let entries: Vec<RepositoryTreeEntry> = items.into_iter().map(Into::into).collect();
        assert_eq!(entries[0].kind, EntryKind::Directory);
        assert_eq!(entries[0].size, None);
        assert_eq!(entries[1].kind, EntryKind::File);
        assert_eq!(entries[1].size, Some(42));
        assert_eq!(entries[2].kind, EntryKind::Submodule);
    }
}
