//! Database repository for CRUD operations.
//!
//! The persistent store behind the dashboard. It is constructed once in `main` and shared
//! through `AppState`; nothing here is process-global.

use chrono::{SecondsFormat, Utc};
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    Dashboard, Folder, GitHubSettings, NewTrackedPage, RevisionInfo, SaveGitHubConfigRequest,
    SitemapSetting, TrackedPage,
};

/// Fixed-width RFC 3339 timestamps so stored values sort chronologically as text.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the current revision ID.
    pub async fn get_revision_id(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT revision_id FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("revision_id"))
    }

    /// Get revision info.
    pub async fn get_revision_info(&self) -> Result<RevisionInfo, AppError> {
        let row = sqlx::query("SELECT revision_id, generated_at FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(RevisionInfo {
            revision_id: row.get("revision_id"),
            generated_at: row.get("generated_at"),
        })
    }

    /// Increment the revision ID and return the new value.
    pub async fn increment_revision(&self) -> Result<i64, AppError> {
        let now = timestamp_now();
        sqlx::query("UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1")
            .bind(&now)
            .execute(&self.pool)
            .await?;
        self.get_revision_id().await
    }

    /// Everything the dashboard shows on load.
    pub async fn get_dashboard(&self) -> Result<Dashboard, AppError> {
        let meta =
            sqlx::query("SELECT schema_version, revision_id, generated_at FROM meta WHERE id = 1")
                .fetch_one(&self.pool)
                .await?;

        let github = self.get_github_settings().await?.view();
        let sitemap = self.get_sitemap_setting().await?;
        let pages = self.list_pages().await?;
        let folders = folders_of(&pages);

        Ok(Dashboard {
            schema_version: meta.get("schema_version"),
            revision_id: meta.get("revision_id"),
            generated_at: meta.get("generated_at"),
            github,
            sitemap,
            pages,
            folders,
        })
    }

    // ==================== CONFIGURATION ====================

    /// The stored GitHub configuration, or an empty one if never saved.
    pub async fn get_github_settings(&self) -> Result<GitHubSettings, AppError> {
        let row = sqlx::query(
            "SELECT token, owner, repo, branch, updated_at FROM github_config WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row
            .map(|row| GitHubSettings {
                token: row.get("token"),
                owner: row.get("owner"),
                repo: row.get("repo"),
                branch: row.get("branch"),
                updated_at: row.get("updated_at"),
            })
            .unwrap_or_default())
    }

    /// Save the GitHub configuration. An empty token keeps the stored one.
    pub async fn save_github_settings(
        &self,
        request: &SaveGitHubConfigRequest,
    ) -> Result<GitHubSettings, AppError> {
        let now = timestamp_now();
        let token = request.token.as_deref().unwrap_or("").trim();
        let branch = request.branch.as_deref().unwrap_or("").trim();

        sqlx::query(
            r#"INSERT INTO github_config (id, token, owner, repo, branch, updated_at)
               VALUES (1, ?, ?, ?, ?, ?)
               ON CONFLICT(id) DO UPDATE SET
                   token = CASE WHEN excluded.token = '' THEN github_config.token ELSE excluded.token END,
                   owner = excluded.owner,
                   repo = excluded.repo,
                   branch = excluded.branch,
                   updated_at = excluded.updated_at"#,
        )
        .bind(token)
        .bind(request.owner.trim())
        .bind(request.repo.trim())
        .bind(branch)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.increment_revision().await?;
        self.get_github_settings().await
    }

    pub async fn get_sitemap_setting(&self) -> Result<SitemapSetting, AppError> {
        let row = sqlx::query("SELECT sitemap_url, updated_at FROM sitemap_config WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?;

        Ok(row
            .map(|row| SitemapSetting {
                sitemap_url: row.get("sitemap_url"),
                updated_at: row.get("updated_at"),
            })
            .unwrap_or_default())
    }

    pub async fn save_sitemap_url(&self, sitemap_url: &str) -> Result<SitemapSetting, AppError> {
        let now = timestamp_now();
        sqlx::query(
            r#"INSERT INTO sitemap_config (id, sitemap_url, updated_at) VALUES (1, ?, ?)
               ON CONFLICT(id) DO UPDATE SET
                   sitemap_url = excluded.sitemap_url,
                   updated_at = excluded.updated_at"#,
        )
        .bind(sitemap_url)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.increment_revision().await?;
        Ok(SitemapSetting {
            sitemap_url: Some(sitemap_url.to_string()),
            updated_at: Some(now),
        })
    }

    // ==================== PAGE OPERATIONS ====================

    /// List all tracked pages in stored order.
    pub async fn list_pages(&self) -> Result<Vec<TrackedPage>, AppError> {
        let rows = sqlx::query(
            "SELECT id, url, name, folder_path, folder_name, repo_file_path, last_synced_at, created_at FROM pages ORDER BY created_at, rowid"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(page_from_row).collect())
    }

    /// Get a tracked page by ID.
    pub async fn get_page(&self, id: &str) -> Result<Option<TrackedPage>, AppError> {
        let row = sqlx::query(
            "SELECT id, url, name, folder_path, folder_name, repo_file_path, last_synced_at, created_at FROM pages WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(page_from_row))
    }

    /// Insert a new tracked page.
    pub async fn create_page(&self, page: &NewTrackedPage) -> Result<TrackedPage, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = timestamp_now();
        let (folder_path, folder_name) = match &page.folder {
            Some(folder) => (Some(folder.path.clone()), Some(folder.name.clone())),
            None => (None, None),
        };

        sqlx::query(
            "INSERT INTO pages (id, url, name, folder_path, folder_name, repo_file_path, last_synced_at, created_at) VALUES (?, ?, ?, ?, ?, ?, NULL, ?)"
        )
        .bind(&id)
        .bind(&page.url)
        .bind(&page.name)
        .bind(&folder_path)
        .bind(&folder_name)
        .bind(&page.repo_file_path)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.increment_revision().await?;

        Ok(TrackedPage {
            id,
            url: page.url.clone(),
            name: page.name.clone(),
            folder_path,
            folder_name,
            repo_file_path: page.repo_file_path.clone(),
            last_synced_at: None,
            created_at: now,
        })
    }

    /// Delete a tracked page.
    pub async fn delete_page(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM pages WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Page {} not found", id)));
        }

        self.increment_revision().await?;
        Ok(())
    }

    /// Record a successful write to the repository.
    pub async fn mark_synced(&self, id: &str, synced_at: &str) -> Result<TrackedPage, AppError> {
        let result = sqlx::query("UPDATE pages SET last_synced_at = ? WHERE id = ?")
            .bind(synced_at)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Page {} not found", id)));
        }

        self.increment_revision().await?;
        self.get_page(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Page {} not found", id)))
    }

    /// Distinct folders used by tracked pages.
    pub async fn list_folders(&self) -> Result<Vec<Folder>, AppError> {
        let pages = self.list_pages().await?;
        Ok(folders_of(&pages))
    }
}

/// Distinct folders, keyed by path, in first-seen order.
fn folders_of(pages: &[TrackedPage]) -> Vec<Folder> {
    let mut folders: Vec<Folder> = Vec::new();
    for page in pages {
        if let (Some(path), Some(name)) = (&page.folder_path, &page.folder_name) {
            if !folders.iter().any(|f| &f.path == path) {
                folders.push(Folder {
                    name: name.clone(),
                    path: path.clone(),
                });
            }
        }
    }
    folders
}

fn page_from_row(row: &sqlx::sqlite::SqliteRow) -> TrackedPage {
    TrackedPage {
        id: row.get("id"),
        url: row.get("url"),
        name: row.get("name"),
        folder_path: row.get("folder_path"),
        folder_name: row.get("folder_name"),
        repo_file_path: row.get("repo_file_path"),
        last_synced_at: row.get("last_synced_at"),
        created_at: row.get("created_at"),
    }
}
