// Mon Feb 02 2026 - Alex

use crate::engine::item::{relative_key, WorkItem};
use itertools::Itertools;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Source root does not exist or is not a directory: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Name list not found: {}", .0.display())]
    ListNotFound(PathBuf),

    #[error("Invalid name list {}: {reason}", path.display())]
    InvalidList { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Enumerates candidate items under a source root.
///
/// Implementations return items sorted by `relative_key` with duplicates
/// removed, so the subset picked for a shard never depends on filesystem
/// iteration order.
pub trait Discoverer {
    fn describe(&self) -> String;

    fn discover(&self, root: &Path) -> Result<Vec<WorkItem>, DiscoveryError>;
}

/// Every regular file below the root whose extension matches, case-insensitively.
#[derive(Debug, Clone)]
pub struct ExtensionDiscoverer {
    ext: String,
}

impl ExtensionDiscoverer {
    pub fn new(ext: &str) -> Self {
        Self {
            ext: ext.trim().trim_start_matches('.').to_lowercase(),
        }
    }

    pub fn ext(&self) -> &str {
        &self.ext
    }

    fn matches(&self, path: &Path) -> bool {
        path.extension()
            .map(|e| e.to_string_lossy().to_lowercase() == self.ext)
            .unwrap_or(false)
    }
}

impl Discoverer for ExtensionDiscoverer {
    fn describe(&self) -> String {
        format!("*.{} files", self.ext)
    }

    fn discover(&self, root: &Path) -> Result<Vec<WorkItem>, DiscoveryError> {
        ensure_root(root)?;

        let items = walk_files(root)
            .filter(|path| self.matches(path))
            .filter_map(|path| WorkItem::from_file(root, &path))
            .collect();

        Ok(finalize(items))
    }
}

/// Directories that contain a sentinel file, e.g. every folder holding a
/// `rendering.png`. The directory's relative path is both key and identifier
/// so outputs mirror the source tree.
#[derive(Debug, Clone)]
pub struct SentinelDiscoverer {
    sentinel: String,
}

impl SentinelDiscoverer {
    pub fn new(sentinel: impl Into<String>) -> Self {
        Self { sentinel: sentinel.into() }
    }

    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }
}

impl Discoverer for SentinelDiscoverer {
    fn describe(&self) -> String {
        format!("directories containing {}", self.sentinel)
    }

    fn discover(&self, root: &Path) -> Result<Vec<WorkItem>, DiscoveryError> {
        ensure_root(root)?;

        let items = walk_files(root)
            .filter(|path| path.file_name().map(|n| n == self.sentinel.as_str()).unwrap_or(false))
            .filter_map(|path| {
                let dir = path.parent()?;
                let key = relative_key(root, dir)?;
                Some(WorkItem::new(key.clone(), path.clone(), key))
            })
            .collect();

        Ok(finalize(items))
    }
}

/// Names read from a JSON array of strings, resolved against the root.
///
/// Listed files that do not exist are still returned; checking and copying
/// report them per item.
#[derive(Debug, Clone)]
pub struct ListDiscoverer {
    list_path: PathBuf,
}

impl ListDiscoverer {
    pub fn new(list_path: impl Into<PathBuf>) -> Self {
        Self { list_path: list_path.into() }
    }

    pub fn load_names(&self) -> Result<Vec<String>, DiscoveryError> {
        if !self.list_path.is_file() {
            return Err(DiscoveryError::ListNotFound(self.list_path.clone()));
        }

        let invalid = |reason: String| DiscoveryError::InvalidList {
            path: self.list_path.clone(),
            reason,
        };

        let text = fs::read_to_string(&self.list_path)?;
        let value: serde_json::Value = serde_json::from_str(&text).map_err(|e| invalid(e.to_string()))?;
        let entries = value
            .as_array()
            .ok_or_else(|| invalid("expected a JSON array such as [\"a.glb\", \"b.glb\"]".to_string()))?;

        entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| {
                let name = entry
                    .as_str()
                    .ok_or_else(|| invalid(format!("entry {} is not a string", idx)))?;
                if name.is_empty() || Path::new(name).is_absolute() || name.split(['/', '\\']).any(|p| p == "..") {
                    return Err(invalid(format!("entry {} ('{}') must be a relative file name", idx, name)));
                }
                Ok(name.to_string())
            })
            .collect()
    }
}

impl Discoverer for ListDiscoverer {
    fn describe(&self) -> String {
        format!("names listed in {}", self.list_path.display())
    }

    fn discover(&self, root: &Path) -> Result<Vec<WorkItem>, DiscoveryError> {
        ensure_root(root)?;

        let items = self
            .load_names()?
            .into_iter()
            .map(|name| WorkItem::new(name.clone(), root.join(&name), name))
            .collect();

        Ok(finalize(items))
    }
}

fn ensure_root(root: &Path) -> Result<(), DiscoveryError> {
    if root.is_dir() {
        Ok(())
    } else {
        Err(DiscoveryError::SourceNotFound(root.to_path_buf()))
    }
}

// Unreadable entries are logged and skipped.
fn walk_files(root: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("skipping unreadable entry: {}", e);
                None
            }
        })
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file())
}

fn finalize(items: Vec<WorkItem>) -> Vec<WorkItem> {
    let items: Vec<WorkItem> = items
        .into_iter()
        .sorted_by(|a, b| a.relative_key().cmp(b.relative_key()))
        .dedup_by(|a, b| a.relative_key() == b.relative_key())
        .collect();

    warn_identifier_collisions(&items);
    items
}

fn warn_identifier_collisions(items: &[WorkItem]) {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    for item in items {
        if let Some(first) = seen.insert(item.identifier(), item.relative_key()) {
            log::warn!(
                "'{}' and '{}' share output identifier '{}'",
                first,
                item.relative_key(),
                item.identifier()
            );
        }
    }
}
