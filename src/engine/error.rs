// Mon Feb 02 2026 - Alex

use crate::orchestration::discovery::DiscoveryError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a run before any item is touched.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid shard spec: shard_index {shard_index} must be in [0, {num_shards}) and num_shards must be > 0")]
    InvalidShardSpec { num_shards: u32, shard_index: u32 },

    #[error("Source root does not exist or is not a directory: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("Cannot create target directory {}", path.display())]
    TargetDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl EngineError {
    pub fn is_source_missing(&self) -> bool {
        matches!(
            self,
            EngineError::SourceNotFound(_)
                | EngineError::Discovery(DiscoveryError::SourceNotFound(_))
        )
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
