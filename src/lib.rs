// Mon Feb 02 2026 - Alex

pub mod config;
pub mod engine;
pub mod orchestration;
pub mod output;
pub mod stages;
pub mod ui;
pub mod utils;

pub use config::{JobFile, RunConfig};
pub use engine::{EngineError, OutputManifest, ProcessingOutcome, ShardRunner, ShardSpec, WorkItem};
pub use orchestration::Discoverer;
pub use output::{RunReporter, RunStats};
pub use stages::{StageKind, StagePlan};
