// Mon Feb 02 2026 - Alex

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One unit of work discovered under the source root.
///
/// `relative_key` is what gets hashed for shard assignment, so it must not
/// depend on where the corpus is mounted. `identifier` names the output
/// location and is what shows up in logs and failure lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    identifier: String,
    source: PathBuf,
    relative_key: String,
}

impl WorkItem {
    pub fn new(identifier: impl Into<String>, source: impl Into<PathBuf>, relative_key: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            source: source.into(),
            relative_key: relative_key.into(),
        }
    }

    pub fn from_file(root: &Path, path: &Path) -> Option<Self> {
        let relative_key = relative_key(root, path)?;
        let identifier = path.file_stem()?.to_string_lossy().into_owned();
        Some(Self::new(identifier, path, relative_key))
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn relative_key(&self) -> &str {
        &self.relative_key
    }

    pub fn stem(&self) -> String {
        self.source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.identifier.clone())
    }

    pub fn file_name(&self) -> String {
        self.source
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.identifier.clone())
    }
}

/// `/`-separated path of `path` relative to `root`, independent of the host
/// separator. The root itself maps to `"."`.
pub fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    if parts.is_empty() {
        Some(".".to_string())
    } else {
        Some(parts.join("/"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputLayout {
    /// `tgt_dir/<identifier>/`
    PerItem,
    /// `tgt_dir/` shared by all items; artifact names must be item-specific.
    Flat,
}

impl OutputLayout {
    pub fn output_dir(&self, tgt_dir: &Path, item: &WorkItem) -> PathBuf {
        match self {
            OutputLayout::PerItem => tgt_dir.join(item.identifier()),
            OutputLayout::Flat => tgt_dir.to_path_buf(),
        }
    }
}

impl Default for OutputLayout {
    fn default() -> Self {
        OutputLayout::PerItem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_file_uses_stem_and_relative_key() {
        let root = Path::new("/data/src");
        let item = WorkItem::from_file(root, Path::new("/data/src/objs/chair.glb")).unwrap();

        assert_eq!(item.identifier(), "chair");
        assert_eq!(item.relative_key(), "objs/chair.glb");
        assert_eq!(item.file_name(), "chair.glb");
    }

    #[test]
    fn test_relative_key_outside_root() {
        assert!(relative_key(Path::new("/a"), Path::new("/b/c")).is_none());
        assert_eq!(relative_key(Path::new("/a"), Path::new("/a")).unwrap(), ".");
    }

    #[test]
    fn test_layout_output_dir() {
        let item = WorkItem::new("x/y", "/src/x/y/rendering.png", "x/y");
        let tgt = Path::new("/out");

        assert_eq!(OutputLayout::PerItem.output_dir(tgt, &item), PathBuf::from("/out/x/y"));
        assert_eq!(OutputLayout::Flat.output_dir(tgt, &item), PathBuf::from("/out"));
    }
}
