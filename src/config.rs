// Mon Feb 02 2026 - Alex

use crate::engine::error::EngineError;
use crate::engine::item::OutputLayout;
use crate::engine::manifest::OutputManifest;
use crate::engine::shard::ShardSpec;
use crate::engine::stage::StageParams;
use crate::stages::StageKind;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Run-scoped settings. Built once before the loop starts and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub stage: String,
    pub src_dir: PathBuf,
    pub tgt_dir: PathBuf,
    pub shard: ShardSpec,
    pub ignore_existing: bool,
    pub manifest: OutputManifest,
    pub layout: OutputLayout,
    pub params: StageParams,
}

impl RunConfig {
    pub fn new(stage: impl Into<String>, src_dir: PathBuf, tgt_dir: PathBuf, manifest: OutputManifest) -> Self {
        Self {
            stage: stage.into(),
            src_dir,
            tgt_dir,
            shard: ShardSpec::whole(),
            ignore_existing: false,
            manifest,
            layout: OutputLayout::PerItem,
            params: StageParams::new(),
        }
    }

    pub fn with_shard(mut self, shard: ShardSpec) -> Self {
        self.shard = shard;
        self
    }

    pub fn with_ignore_existing(mut self, ignore_existing: bool) -> Self {
        self.ignore_existing = ignore_existing;
        self
    }

    pub fn with_layout(mut self, layout: OutputLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_params(mut self, params: StageParams) -> Self {
        self.params = params;
        self
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        self.shard.validate()?;
        self.manifest.validate()?;

        if self.stage.trim().is_empty() {
            return Err(EngineError::InvalidConfig("stage name is empty".to_string()));
        }
        if self.src_dir == self.tgt_dir {
            return Err(EngineError::InvalidConfig(format!(
                "src_dir and tgt_dir must differ (both are {})",
                self.src_dir.display()
            )));
        }
        if self.layout == OutputLayout::Flat && !self.manifest.is_templated() {
            return Err(EngineError::InvalidConfig(
                "flat output layout needs item-specific artifact names such as {name}".to_string(),
            ));
        }
        Ok(())
    }
}

/// Stage settings kept next to a dataset so every worker launches the same job.
/// Anything set on the command line takes precedence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobFile {
    pub stage: Option<StageKind>,
    pub ext: Option<String>,
    pub sentinel: Option<String>,
    pub json: Option<PathBuf>,
    pub require: Vec<String>,
    pub command: Option<String>,
    pub args: Vec<String>,
    pub params: IndexMap<String, String>,
    pub sidecar: Option<String>,
}

impl JobFile {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        let path = path.as_ref();

        if !path.is_file() {
            return Err(EngineError::InvalidConfig(format!("job file not found: {}", path.display())));
        }

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !ext.eq_ignore_ascii_case("json") {
            return Err(EngineError::InvalidConfig(format!(
                "unsupported job file format '{}' (expected .json)",
                ext
            )));
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| EngineError::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        let mut job: JobFile = serde_json::from_str(&contents)
            .map_err(|e| EngineError::InvalidConfig(format!("{}: {}", path.display(), e)))?;

        job.params = job
            .params
            .into_iter()
            .map(|(k, v)| (k.replace('-', "_"), v))
            .collect();
        Ok(job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> RunConfig {
        RunConfig::new(
            "points",
            PathBuf::from("/data/src"),
            PathBuf::from("/data/out"),
            OutputManifest::new(["points.npy"]).unwrap(),
        )
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(base().validate().is_ok());
    }

    #[test]
    fn test_same_src_and_tgt_rejected() {
        let mut config = base();
        config.tgt_dir = config.src_dir.clone();
        assert!(matches!(config.validate(), Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn test_flat_layout_needs_template() {
        let config = base().with_layout(OutputLayout::Flat);
        assert!(config.validate().is_err());

        let mut config = base().with_layout(OutputLayout::Flat);
        config.manifest = OutputManifest::new(["{name}"]).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialized_shard_is_rechecked() {
        let mut value = serde_json::to_value(base()).unwrap();
        value["shard"] = serde_json::json!({ "num_shards": 2, "shard_index": 5 });
        let config: RunConfig = serde_json::from_value(value).unwrap();

        assert!(matches!(config.validate(), Err(EngineError::InvalidShardSpec { .. })));
    }

    #[test]
    fn test_job_file_load() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("job.json");
        fs::write(
            &path,
            r#"{"stage": "render", "command": "blender", "params": {"image-size": "512"}}"#,
        )
        .unwrap();

        let job = JobFile::load(&path).unwrap();
        assert_eq!(job.stage, Some(StageKind::Render));
        assert_eq!(job.command.as_deref(), Some("blender"));
        assert_eq!(job.params["image_size"], "512");
        assert!(job.require.is_empty());
    }

    #[test]
    fn test_job_file_rejects_unknown_keys_and_formats() {
        let dir = tempfile::TempDir::new().unwrap();
        let typo = dir.path().join("job.json");
        fs::write(&typo, r#"{"comand": "x"}"#).unwrap();
        assert!(JobFile::load(&typo).is_err());

        let toml = dir.path().join("job.toml");
        fs::write(&toml, "stage = 'points'").unwrap();
        assert!(JobFile::load(&toml).is_err());

        assert!(JobFile::load(dir.path().join("missing.json")).is_err());
    }
}
