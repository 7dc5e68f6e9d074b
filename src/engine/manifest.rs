// Mon Feb 02 2026 - Alex

use crate::engine::error::EngineError;
use crate::engine::item::WorkItem;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Artifact names that together mean "this item is done".
///
/// Names may carry `{id}`, `{stem}` or `{name}` placeholders; call
/// [`OutputManifest::resolve`] to get the concrete names for one item.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputManifest {
    artifacts: IndexSet<String>,
}

impl OutputManifest {
    pub fn new<I, S>(artifacts: I) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let manifest = Self {
            artifacts: artifacts.into_iter().map(Into::into).collect(),
        };
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.artifacts.is_empty() {
            return Err(EngineError::InvalidManifest("manifest lists no artifacts".to_string()));
        }
        for name in &self.artifacts {
            if name.trim().is_empty() {
                return Err(EngineError::InvalidManifest("empty artifact name".to_string()));
            }
            if Path::new(name).is_absolute() || name.split(['/', '\\']).any(|part| part == "..") {
                return Err(EngineError::InvalidManifest(format!(
                    "artifact '{}' must stay inside the item output directory",
                    name
                )));
            }
        }
        Ok(())
    }

    pub fn artifacts(&self) -> impl Iterator<Item = &str> {
        self.artifacts.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.artifacts.contains(name)
    }

    pub fn is_templated(&self) -> bool {
        self.artifacts.iter().any(|a| a.contains('{'))
    }

    /// Renders placeholders against `item`. Order is preserved and names that
    /// collapse to the same string are kept once.
    pub fn resolve(&self, item: &WorkItem) -> OutputManifest {
        if !self.is_templated() {
            return self.clone();
        }

        let stem = item.stem();
        let name = item.file_name();
        let artifacts = self
            .artifacts
            .iter()
            .map(|a| {
                a.replace("{id}", item.identifier())
                    .replace("{stem}", &stem)
                    .replace("{name}", &name)
            })
            .collect();

        OutputManifest { artifacts }
    }
}

impl<S: Into<String>> FromIterator<S> for OutputManifest {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            artifacts: iter.into_iter().map(Into::into).collect(),
        }
    }
}

pub fn missing_artifacts(output_dir: &Path, manifest: &OutputManifest) -> Vec<String> {
    manifest
        .artifacts()
        .filter(|name| !output_dir.join(name).exists())
        .map(str::to_string)
        .collect()
}

pub fn is_complete(output_dir: &Path, manifest: &OutputManifest) -> bool {
    manifest.artifacts().all(|name| output_dir.join(name).exists())
}

/// With `ignore_existing` unset nothing is ever skipped. Otherwise an item is
/// skipped only when every manifest artifact already exists; a half-written
/// output directory is reprocessed.
pub fn should_skip(output_dir: &Path, manifest: &OutputManifest, ignore_existing: bool) -> bool {
    if !ignore_existing {
        return false;
    }
    is_complete(output_dir, manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn points_manifest() -> OutputManifest {
        OutputManifest::new(["points.npy", "num_parts.json"]).unwrap()
    }

    #[test]
    fn test_skip_when_all_present() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("points.npy"), b"x").unwrap();
        fs::write(dir.path().join("num_parts.json"), b"{}").unwrap();

        assert!(should_skip(dir.path(), &points_manifest(), true));
    }

    #[test]
    fn test_partial_output_is_not_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("points.npy"), b"x").unwrap();

        assert!(!should_skip(dir.path(), &points_manifest(), true));
        assert_eq!(missing_artifacts(dir.path(), &points_manifest()), vec!["num_parts.json"]);
    }

    #[test]
    fn test_removing_any_file_breaks_completeness() {
        let dir = TempDir::new().unwrap();
        let manifest = points_manifest();
        for name in manifest.artifacts() {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        assert!(should_skip(dir.path(), &manifest, true));

        for name in manifest.artifacts() {
            let path = dir.path().join(name);
            fs::remove_file(&path).unwrap();
            assert!(!should_skip(dir.path(), &manifest, true));
            fs::write(&path, b"x").unwrap();
        }
    }

    #[test]
    fn test_ignore_existing_false_never_skips() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("points.npy"), b"x").unwrap();
        fs::write(dir.path().join("num_parts.json"), b"{}").unwrap();

        assert!(!should_skip(dir.path(), &points_manifest(), false));
        assert!(!should_skip(Path::new("/definitely/not/here"), &points_manifest(), false));
    }

    #[test]
    fn test_missing_output_dir() {
        assert!(!should_skip(Path::new("/definitely/not/here"), &points_manifest(), true));
    }

    #[test]
    fn test_empty_and_escaping_manifests_rejected() {
        assert!(OutputManifest::new(Vec::<String>::new()).is_err());
        assert!(OutputManifest::new([" "]).is_err());
        assert!(OutputManifest::new(["../other/points.npy"]).is_err());
        assert!(OutputManifest::new(["sub/points.npy"]).is_ok());
    }

    #[test]
    fn test_duplicates_collapse_in_order() {
        let m = OutputManifest::new(["b", "a", "b"]).unwrap();
        assert_eq!(m.artifacts().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn test_resolve_placeholders() {
        let item = WorkItem::new("chair", "/src/objs/chair.glb", "objs/chair.glb");
        let m = OutputManifest::new(["{name}", "{stem}.json", "{id}/meta.json", "fixed.png"]).unwrap();

        let resolved = m.resolve(&item);
        assert_eq!(
            resolved.artifacts().collect::<Vec<_>>(),
            vec!["chair.glb", "chair.json", "chair/meta.json", "fixed.png"]
        );
        assert!(!resolved.is_templated());
    }
}
