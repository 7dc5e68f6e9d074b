// Mon Feb 02 2026 - Alex

use crate::engine::item::WorkItem;
use crate::engine::stage::{StageError, StageParams, StageResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Provenance record written next to an item's artifacts. The engine never
/// reads it back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sidecar {
    pub stage: String,
    pub source: String,
    pub relative_key: String,
    pub params: StageParams,
}

impl Sidecar {
    pub fn new(stage: &str, item: &WorkItem, params: &StageParams) -> Self {
        Self {
            stage: stage.to_string(),
            source: item.source().display().to_string(),
            relative_key: item.relative_key().to_string(),
            params: params.clone(),
        }
    }

    pub fn write(&self, output_dir: &Path, file_name: &str) -> StageResult<PathBuf> {
        let path = output_dir.join(file_name);
        let body = serde_json::to_string_pretty(self)?;
        fs::write(&path, body)?;
        Ok(path)
    }

    pub fn read(path: &Path) -> StageResult<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
