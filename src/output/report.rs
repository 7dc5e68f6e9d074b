// Mon Feb 02 2026 - Alex

use crate::config::RunConfig;
use crate::engine::item::WorkItem;
use crate::engine::result::ProcessingOutcome;
use crate::engine::shard::ShardSpec;
use crate::output::stats::RunStats;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Receives run events from the runner. One instance lives for one run.
pub trait RunReporter {
    fn run_started(&mut self, config: &RunConfig, discovered: usize, selected: usize);

    fn item_started(&mut self, _position: usize, _total: usize, _item: &WorkItem) {}

    fn item_finished(
        &mut self,
        position: usize,
        total: usize,
        item: &WorkItem,
        output_dir: &Path,
        outcome: &ProcessingOutcome,
    );

    fn finish(&mut self, stats: &RunStats);
}

/// Line-per-item reporter on top of the `log` facade.
#[derive(Debug, Default)]
pub struct LogReporter {
    stage: String,
}

impl LogReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RunReporter for LogReporter {
    fn run_started(&mut self, config: &RunConfig, discovered: usize, selected: usize) {
        self.stage = config.stage.clone();
        log::info!(
            "[{}] discovered {} items, this shard selected {} (index={})",
            self.stage, discovered, selected, config.shard
        );
    }

    fn item_started(&mut self, position: usize, total: usize, item: &WorkItem) {
        log::info!("[{}/{}] processing: {}", position, total, item.source().display());
    }

    fn item_finished(
        &mut self,
        position: usize,
        total: usize,
        item: &WorkItem,
        output_dir: &Path,
        outcome: &ProcessingOutcome,
    ) {
        match outcome {
            ProcessingOutcome::Success(_) => {
                log::info!("done -> {}", output_dir.display());
            }
            ProcessingOutcome::Skipped(reason) => {
                log::info!("[{}/{}] skip {}: {}", position, total, reason, item.source().display());
            }
            ProcessingOutcome::Failed(error) => {
                log::error!("failed: {} | {}", item.source().display(), error);
            }
        }
    }

    fn finish(&mut self, stats: &RunStats) {
        log_summary(&self.stage, stats);
    }
}

/// Final summary shared by every reporter: counts, then one line per failure.
pub fn log_summary(stage: &str, stats: &RunStats) {
    log::info!("[{}] {}", stage, stats.summary_line());
    if stats.has_failures() {
        log::warn!("[{}] {} failed item(s), rerun with --ignore_existing to retry only these:", stage, stats.failed);
        for failure in &stats.failures {
            log::warn!("  {} | {}", failure.identifier, failure.error);
        }
    }
}

/// Machine-readable record of one worker's run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub stage: String,
    pub src_dir: PathBuf,
    pub tgt_dir: PathBuf,
    pub shard: ShardSpec,
    pub ignore_existing: bool,
    pub stats: RunStats,
}

impl RunReport {
    pub fn new(config: &RunConfig, stats: &RunStats) -> Self {
        Self {
            stage: config.stage.clone(),
            src_dir: config.src_dir.clone(),
            tgt_dir: config.tgt_dir.clone(),
            shard: config.shard,
            ignore_existing: config.ignore_existing,
            stats: stats.clone(),
        }
    }
}

/// Writes `report` as pretty JSON next to `path` and renames it into place so
/// a reader never sees a half-written file.
pub fn write_report(path: &Path, report: &RunReport) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp = path.with_extension("json.tmp");
    {
        let mut file = fs::File::create(&tmp)?;
        serde_json::to_writer_pretty(&mut file, report)?;
        file.write_all(b"\n")?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)
}
