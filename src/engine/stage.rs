// Mon Feb 02 2026 - Alex

use crate::engine::item::WorkItem;
use crate::engine::manifest::OutputManifest;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type StageParams = IndexMap<String, String>;

/// Per-item failure raised by a stage processor. Always recovered by the runner.
#[derive(Error, Debug)]
pub enum StageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Source not found: {}", .0.display())]
    MissingSource(PathBuf),

    #[error("Failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command exited with {status}: {stderr}")]
    CommandFailed { status: String, stderr: String },

    #[error("Sidecar JSON error: {0}")]
    Sidecar(#[from] serde_json::Error),

    #[error("Processor panicked: {0}")]
    Panicked(String),

    #[error("{0}")]
    Custom(String),
}

pub type StageResult<T> = Result<T, StageError>;

#[derive(Debug, Clone, Copy)]
pub struct ProcessContext<'a> {
    pub stage: &'a str,
    pub output_dir: &'a Path,
    pub manifest: &'a OutputManifest,
    pub params: &'a StageParams,
}

/// The pluggable per-item work of a stage.
///
/// Implementations must write only under `ctx.output_dir`, must be safe to
/// re-run on the same item, and must produce every artifact in
/// `ctx.manifest` when they return `Ok`. None of this is enforced; a
/// processor that writes fewer files than the manifest will be retried on
/// every resumed run.
pub trait StageProcessor {
    fn name(&self) -> &str;

    fn process(&self, item: &WorkItem, ctx: &ProcessContext<'_>) -> StageResult<Vec<String>>;
}
