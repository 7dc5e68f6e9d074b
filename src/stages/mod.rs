// Tue Feb 03 2026 - Alex

pub mod command;
pub mod copy;
pub mod params;

pub use command::CommandProcessor;
pub use copy::{CopyProcessor, ListCheck};
pub use params::{parse_param, parse_size, ParamError};

use crate::config::{JobFile, RunConfig};
use crate::engine::error::EngineError;
use crate::engine::item::OutputLayout;
use crate::engine::manifest::OutputManifest;
use crate::engine::shard::ShardSpec;
use crate::engine::stage::StageProcessor;
use crate::orchestration::discovery::{Discoverer, ExtensionDiscoverer, ListDiscoverer, SentinelDiscoverer};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StageKind {
    /// mesh -> surface points (points.npy, num_parts.json)
    Points,
    /// mesh -> single-view rendering (rendering.png)
    Render,
    /// rendering -> background removed (rendering_rmbg.png)
    Rmbg,
    /// mesh -> part IoU scores (iou.json)
    Iou,
    /// listed part folders -> one merged mesh each (<id>.glb, flat)
    Merge,
    /// plain file copy into a flat target directory
    Copy,
    /// everything supplied on the command line or in a job file
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryRule {
    Extension(String),
    Sentinel(String),
    NameList,
    Unset,
}

#[derive(Debug, Clone)]
pub struct StagePreset {
    pub kind: StageKind,
    pub discovery: DiscoveryRule,
    pub manifest: &'static [&'static str],
    pub layout: OutputLayout,
    pub sidecar: Option<&'static str>,
    pub default_params: &'static [(&'static str, &'static str)],
    pub external: bool,
}

const RENDER_DEFAULTS: &[(&str, &str)] = &[
    ("radius", "4.0"),
    ("image_size", "2048x2048"),
    ("light_intensity", "2.5"),
    ("num_env_lights", "36"),
];

impl StageKind {
    pub fn name(&self) -> &'static str {
        match self {
            StageKind::Points => "points",
            StageKind::Render => "render",
            StageKind::Rmbg => "rmbg",
            StageKind::Iou => "iou",
            StageKind::Merge => "merge",
            StageKind::Copy => "copy",
            StageKind::Custom => "custom",
        }
    }

    pub fn preset(&self) -> StagePreset {
        let glb = || DiscoveryRule::Extension(".glb".to_string());
        match self {
            StageKind::Points => StagePreset {
                kind: *self,
                discovery: glb(),
                manifest: &["points.npy", "num_parts.json"],
                layout: OutputLayout::PerItem,
                sidecar: None,
                default_params: &[],
                external: true,
            },
            StageKind::Render => StagePreset {
                kind: *self,
                discovery: glb(),
                manifest: &["rendering.png"],
                layout: OutputLayout::PerItem,
                sidecar: Some("render_cfg.json"),
                default_params: RENDER_DEFAULTS,
                external: true,
            },
            StageKind::Rmbg => StagePreset {
                kind: *self,
                discovery: DiscoveryRule::Sentinel("rendering.png".to_string()),
                manifest: &["rendering_rmbg.png"],
                layout: OutputLayout::PerItem,
                sidecar: None,
                default_params: &[],
                external: true,
            },
            StageKind::Iou => StagePreset {
                kind: *self,
                discovery: glb(),
                manifest: &["iou.json"],
                layout: OutputLayout::PerItem,
                sidecar: None,
                default_params: &[],
                external: true,
            },
            StageKind::Merge => StagePreset {
                kind: *self,
                discovery: DiscoveryRule::NameList,
                manifest: &["{id}.glb"],
                layout: OutputLayout::Flat,
                sidecar: None,
                default_params: &[],
                external: true,
            },
            StageKind::Copy => StagePreset {
                kind: *self,
                discovery: DiscoveryRule::Unset,
                manifest: &["{name}"],
                layout: OutputLayout::Flat,
                sidecar: None,
                default_params: &[],
                external: false,
            },
            StageKind::Custom => StagePreset {
                kind: *self,
                discovery: DiscoveryRule::Unset,
                manifest: &[],
                layout: OutputLayout::PerItem,
                sidecar: None,
                default_params: &[],
                external: true,
            },
        }
    }
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// Flags win over the job file, which wins over the preset.
#[derive(Debug, Clone, Default)]
pub struct StageOptions {
    pub stage: Option<StageKind>,
    pub src_dir: PathBuf,
    pub tgt_dir: PathBuf,
    pub num_shards: u32,
    pub shard_index: u32,
    pub ignore_existing: bool,
    pub ext: Option<String>,
    pub sentinel: Option<String>,
    pub list: Option<PathBuf>,
    pub require: Vec<String>,
    pub command: Option<String>,
    pub args: Vec<String>,
    pub params: Vec<(String, String)>,
    pub sidecar: Option<String>,
    pub no_sidecar: bool,
}

impl StageOptions {
    /// Fills fields the command line left empty from `job`.
    pub fn layer_job(mut self, job: JobFile) -> Self {
        self.stage = self.stage.or(job.stage);
        self.ext = self.ext.or(job.ext);
        self.sentinel = self.sentinel.or(job.sentinel);
        self.list = self.list.or(job.json);
        self.command = self.command.or(job.command);
        self.sidecar = self.sidecar.or(job.sidecar);
        if self.require.is_empty() {
            self.require = job.require;
        }
        if self.args.is_empty() {
            self.args = job.args;
        }

        let mut params: Vec<(String, String)> = job.params.into_iter().collect();
        params.extend(self.params);
        self.params = params;
        self
    }
}

/// Configuration and discovery only; enough to check a shard's outputs.
pub struct StageSelection {
    pub kind: StageKind,
    pub config: RunConfig,
    pub discoverer: Box<dyn Discoverer>,
}

impl StageSelection {
    pub fn build(opts: &StageOptions) -> Result<Self, EngineError> {
        let kind = opts.stage.ok_or_else(|| {
            EngineError::InvalidConfig("no stage given; pass --stage or set \"stage\" in the job file".to_string())
        })?;
        let preset = kind.preset();

        let shard = ShardSpec::new(opts.num_shards, opts.shard_index)?;
        let discoverer = discoverer_for(&preset, opts)?;
        let manifest = if !opts.require.is_empty() {
            OutputManifest::new(opts.require.iter().cloned())?
        } else if !preset.manifest.is_empty() {
            OutputManifest::new(preset.manifest.iter().copied())?
        } else {
            return Err(EngineError::InvalidConfig(format!(
                "stage '{}' needs at least one --require artifact",
                kind
            )));
        };

        let params = params::merge_params(preset.default_params, &opts.params);
        if kind == StageKind::Render {
            params::validate_render_params(&params).map_err(|e| EngineError::InvalidConfig(e.to_string()))?;
        }

        let config = RunConfig::new(kind.name(), opts.src_dir.clone(), opts.tgt_dir.clone(), manifest)
            .with_shard(shard)
            .with_ignore_existing(opts.ignore_existing)
            .with_layout(preset.layout)
            .with_params(params);
        config.validate()?;

        Ok(Self {
            kind,
            config,
            discoverer,
        })
    }
}

pub struct StagePlan {
    pub config: RunConfig,
    pub discoverer: Box<dyn Discoverer>,
    pub processor: Box<dyn StageProcessor>,
}

impl std::fmt::Debug for StagePlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StagePlan")
            .field("config", &self.config)
            .field("discoverer", &self.discoverer.describe())
            .field("processor", &self.processor.name())
            .finish()
    }
}

impl StagePlan {
    pub fn build(opts: StageOptions) -> Result<Self, EngineError> {
        let StageSelection {
            kind,
            config,
            discoverer,
        } = StageSelection::build(&opts)?;
        let preset = kind.preset();

        let sidecar = if opts.no_sidecar {
            None
        } else {
            opts.sidecar.or_else(|| preset.sidecar.map(str::to_string))
        };

        let processor: Box<dyn StageProcessor> = match (opts.command, preset.external) {
            (Some(program), _) => Box::new(
                CommandProcessor::new(kind.name(), program)
                    .with_args(opts.args)
                    .with_sidecar(sidecar),
            ),
            (None, false) => Box::new(CopyProcessor::new()),
            (None, true) => {
                return Err(EngineError::InvalidConfig(format!(
                    "stage '{}' runs an external tool; pass --command",
                    kind
                )))
            }
        };

        Ok(Self {
            config,
            discoverer,
            processor,
        })
    }
}

fn discoverer_for(preset: &StagePreset, opts: &StageOptions) -> Result<Box<dyn Discoverer>, EngineError> {
    if let Some(list) = &opts.list {
        return Ok(Box::new(ListDiscoverer::new(list.clone())));
    }
    if let Some(ext) = &opts.ext {
        if ext.trim().trim_start_matches('.').is_empty() {
            return Err(EngineError::InvalidConfig("--ext must not be empty".to_string()));
        }
        return Ok(Box::new(ExtensionDiscoverer::new(ext)));
    }
    if let Some(sentinel) = &opts.sentinel {
        return Ok(Box::new(SentinelDiscoverer::new(sentinel.clone())));
    }

    match &preset.discovery {
        DiscoveryRule::Extension(ext) => Ok(Box::new(ExtensionDiscoverer::new(ext))),
        DiscoveryRule::Sentinel(name) => Ok(Box::new(SentinelDiscoverer::new(name.clone()))),
        DiscoveryRule::NameList => Err(EngineError::InvalidConfig(format!(
            "stage '{}' needs --json with the list of item names",
            preset.kind
        ))),
        DiscoveryRule::Unset => Err(EngineError::InvalidConfig(format!(
            "stage '{}' needs --ext, --sentinel or --json to find its inputs",
            preset.kind
        ))),
    }
}
