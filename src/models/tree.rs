//! Repository tree snapshot and folder view.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
    Submodule,
}

impl EntryKind {
    /// Map a git tree object type (`blob`, `tree`, `commit`).
    pub fn from_git_type(git_type: &str) -> Self {
        match git_type {
            "tree" => EntryKind::Directory,
            "commit" => EntryKind::Submodule,
            _ => EntryKind::File,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryTreeEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    pub sha: String,
}

/// A fresh, never-persisted listing of the repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryTree {
    pub entries: Vec<RepositoryTreeEntry>,
    /// GitHub cut the listing short; membership checks may yield false negatives
    pub truncated: bool,
    pub branch: String,
}

impl RepositoryTree {
    /// Paths of file entries only.
    pub fn file_paths(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| e.kind == EntryKind::File)
            .map(|e| e.path.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderFile {
    pub path: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    pub sha: String,
    /// Some tracked page writes to this path
    pub tracked: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderNode {
    pub files: Vec<FolderFile>,
    pub subfolders: Vec<String>,
}

/// Folder map keyed by folder path; `""` is the repository root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderView {
    pub folders: BTreeMap<String, FolderNode>,
    pub truncated: bool,
    pub branch: String,
}
