// Tue Feb 03 2026 - Alex

use crate::config::RunConfig;
use crate::engine::error::EngineError;
use crate::engine::manifest::missing_artifacts;
use crate::orchestration::discovery::Discoverer;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncompleteItem {
    pub identifier: String,
    pub missing: Vec<String>,
}

/// Completeness of one shard's outputs, without processing anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReport {
    pub discovered: usize,
    pub complete: Vec<String>,
    pub incomplete: Vec<IncompleteItem>,
}

impl CheckReport {
    pub fn selected(&self) -> usize {
        self.complete.len() + self.incomplete.len()
    }

    pub fn is_resolved(&self) -> bool {
        self.incomplete.is_empty()
    }
}

/// Same discovery and selection as a run, then a manifest check per item.
pub fn check_shard(config: &RunConfig, discoverer: &dyn Discoverer) -> Result<CheckReport, EngineError> {
    config.validate()?;
    if !config.src_dir.is_dir() {
        return Err(EngineError::SourceNotFound(config.src_dir.clone()));
    }

    let items = discoverer.discover(&config.src_dir)?;
    let mut report = CheckReport {
        discovered: items.len(),
        ..CheckReport::default()
    };

    for item in config.shard.select(items) {
        let output_dir = config.layout.output_dir(&config.tgt_dir, &item);
        let missing = missing_artifacts(&output_dir, &config.manifest.resolve(&item));

        if missing.is_empty() {
            report.complete.push(item.identifier().to_string());
        } else {
            report.incomplete.push(IncompleteItem {
                identifier: item.identifier().to_string(),
                missing,
            });
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::manifest::OutputManifest;
    use crate::orchestration::discovery::ExtensionDiscoverer;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_check_reports_missing_artifacts() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        let tgt = dir.path().join("out");
        fs::create_dir_all(&src).unwrap();
        for name in ["a.glb", "b.glb", "c.glb"] {
            fs::write(src.join(name), b"x").unwrap();
        }
        fs::create_dir_all(tgt.join("a")).unwrap();
        fs::write(tgt.join("a/points.npy"), b"x").unwrap();
        fs::write(tgt.join("a/num_parts.json"), b"{}").unwrap();
        fs::create_dir_all(tgt.join("b")).unwrap();
        fs::write(tgt.join("b/points.npy"), b"x").unwrap();

        let config = RunConfig::new(
            "points",
            src,
            tgt.clone(),
            OutputManifest::new(["points.npy", "num_parts.json"]).unwrap(),
        );
        let report = check_shard(&config, &ExtensionDiscoverer::new(".glb")).unwrap();

        assert_eq!(report.discovered, 3);
        assert_eq!(report.complete, vec!["a"]);
        assert_eq!(report.incomplete.len(), 2);
        assert_eq!(report.incomplete[0].identifier, "b");
        assert_eq!(report.incomplete[0].missing, vec!["num_parts.json"]);
        assert_eq!(report.incomplete[1].missing, vec!["points.npy", "num_parts.json"]);
        assert!(!report.is_resolved());
        assert!(!tgt.join("c").exists());
    }
}
