// Mon Feb 02 2026 - Alex

pub mod check;
pub mod error;
pub mod item;
pub mod manifest;
pub mod result;
pub mod runner;
pub mod shard;
pub mod stage;

pub use check::{check_shard, CheckReport};
pub use error::EngineError;
pub use item::{OutputLayout, WorkItem};
pub use manifest::{missing_artifacts, should_skip, OutputManifest};
pub use result::ProcessingOutcome;
pub use runner::{RunnerState, ShardRunner};
pub use shard::{shard_of, ShardSpec};
pub use stage::{ProcessContext, StageError, StageParams, StageProcessor};
