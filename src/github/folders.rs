//! Folder view reconstructed from a flat tree listing.

use std::collections::{BTreeMap, HashSet};

use crate::models::{EntryKind, FolderFile, FolderNode, RepositoryTreeEntry};

fn parent_of(path: &str) -> &str {
    path.rsplit_once('/').map(|(parent, _)| parent).unwrap_or("")
}

/// Build a map of folder path -> files and direct subfolders. `""` is the root.
///
/// Folders missing from a truncated listing are inferred from the paths beneath them,
/// so every file hangs off a chain of folders back to the root.
pub fn build_folder_tree(
    entries: &[RepositoryTreeEntry],
    tracked_paths: &HashSet<String>,
) -> BTreeMap<String, FolderNode> {
    let mut folders: BTreeMap<String, FolderNode> = BTreeMap::new();
    folders.insert(String::new(), FolderNode::default());

    for entry in entries.iter().filter(|e| e.kind == EntryKind::Directory) {
        folders.entry(entry.path.clone()).or_default();
    }

    for entry in entries.iter().filter(|e| e.kind != EntryKind::Directory) {
        let name = entry.path.rsplit('/').next().unwrap_or(&entry.path);
        folders
            .entry(parent_of(&entry.path).to_string())
            .or_default()
            .files
            .push(FolderFile {
                path: entry.path.clone(),
                name: name.to_string(),
                size: entry.size,
                sha: entry.sha.clone(),
                tracked: tracked_paths.contains(&entry.path),
            });
    }

    // Link every folder to its parent, creating missing ancestors on the way up
    let mut pending: Vec<String> = folders.keys().filter(|k| !k.is_empty()).cloned().collect();
    while let Some(path) = pending.pop() {
        let parent = parent_of(&path).to_string();
        if !folders.contains_key(&parent) {
            pending.push(parent.clone());
        }
        let node = folders.entry(parent).or_default();
        if !node.subfolders.contains(&path) {
            node.subfolders.push(path);
        }
    }

    for node in folders.values_mut() {
        node.files.sort_by(|a, b| a.path.cmp(&b.path));
        node.subfolders.sort();
    }

    folders
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, kind: EntryKind) -> RepositoryTreeEntry {
        RepositoryTreeEntry {
            path: path.to_string(),
            kind,
            size: (kind == EntryKind::File).then_some(10),
            sha: format!("sha-{}", path),
        }
    }

    #[test]
    fn test_builds_nested_structure() {
        let entries = vec![
            entry("index.html", EntryKind::File),
            entry("gallery", EntryKind::Directory),
            entry("gallery/lumora-25.html", EntryKind::File),
            entry("gallery/2024", EntryKind::Directory),
            entry("gallery/2024/spring.html", EntryKind::File),
        ];
        let tracked: HashSet<String> = ["gallery/lumora-25.html".to_string()].into();

        let folders = build_folder_tree(&entries, &tracked);

        assert_eq!(folders[""].subfolders, vec!["gallery"]);
        assert_eq!(folders[""].files.len(), 1);
        assert_eq!(folders["gallery"].subfolders, vec!["gallery/2024"]);
        assert_eq!(folders["gallery"].files[0].name, "lumora-25.html");
        assert!(folders["gallery"].files[0].tracked);
        assert!(!folders["gallery/2024"].files[0].tracked);
    }

    #[test]
    fn test_infers_missing_ancestors() {
        // Truncated listings can omit directory entries
        let entries = vec![entry("a/b/c/deep.html", EntryKind::File)];
        let folders = build_folder_tree(&entries, &HashSet::new());

        assert_eq!(folders[""].subfolders, vec!["a"]);
        assert_eq!(folders["a"].subfolders, vec!["a/b"]);
        assert_eq!(folders["a/b"].subfolders, vec!["a/b/c"]);
        assert_eq!(folders["a/b/c"].files[0].path, "a/b/c/deep.html");
    }

    #[test]
    fn test_empty_tree_has_root() {
        let folders = build_folder_tree(&[], &HashSet::new());
        assert_eq!(folders.len(), 1);
        assert!(folders[""].files.is_empty());
    }
}
