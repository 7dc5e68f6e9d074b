// Mon Feb 02 2026 - Alex

use crate::config::RunConfig;
use crate::engine::error::EngineError;
use crate::engine::item::{OutputLayout, WorkItem};
use crate::engine::manifest::{missing_artifacts, should_skip};
use crate::engine::result::ProcessingOutcome;
use crate::engine::stage::{ProcessContext, StageError, StageProcessor};
use crate::orchestration::discovery::Discoverer;
use crate::output::report::RunReporter;
use crate::output::stats::RunStats;
use crate::utils::logging::ScopedTimer;
use std::any::Any;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::time::Instant;

pub const SKIP_EXISTING: &str = "existing output";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    Idle,
    Selecting,
    Skipping,
    Processing,
    Recording,
    Done,
}

/// Drives one worker's shard: select, skip-or-process each item, record.
///
/// Items run strictly one after another. A failing or panicking processor
/// call is contained at the item boundary; only configuration problems
/// found before the first item can make `run` return an error.
pub struct ShardRunner<'a> {
    config: &'a RunConfig,
    processor: &'a dyn StageProcessor,
    reporter: &'a mut dyn RunReporter,
    state: RunnerState,
}

impl<'a> ShardRunner<'a> {
    pub fn new(config: &'a RunConfig, processor: &'a dyn StageProcessor, reporter: &'a mut dyn RunReporter) -> Self {
        Self {
            config,
            processor,
            reporter,
            state: RunnerState::Idle,
        }
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    pub fn run(&mut self, discoverer: &dyn Discoverer) -> Result<RunStats, EngineError> {
        let started = Instant::now();
        let _timer = ScopedTimer::new(&format!("{} shard {}", self.config.stage, self.config.shard));

        let items = prepare(self.config, discoverer)?;

        self.state = RunnerState::Selecting;
        let mut stats = RunStats::new();
        stats.discovered = items.len();

        if items.is_empty() {
            log::info!(
                "no {} found in {}",
                discoverer.describe(),
                self.config.src_dir.display()
            );
            stats.elapsed = started.elapsed();
            self.state = RunnerState::Done;
            self.reporter.finish(&stats);
            return Ok(stats);
        }

        if self.config.layout == OutputLayout::Flat {
            for collision in output_collisions(self.config, &items) {
                log::warn!(
                    "'{}' and '{}' both write {}",
                    collision.first,
                    collision.second,
                    collision.path.display()
                );
            }
        }

        let selected = self.config.shard.select(items);
        stats.selected = selected.len();
        self.reporter.run_started(self.config, stats.discovered, stats.selected);

        let total = selected.len();
        for (idx, item) in selected.iter().enumerate() {
            let position = idx + 1;
            let output_dir = self.config.layout.output_dir(&self.config.tgt_dir, item);
            let outcome = self.run_item(position, total, item, &output_dir);

            self.state = RunnerState::Recording;
            stats.record(item, &outcome);
            self.reporter.item_finished(position, total, item, &output_dir, &outcome);
        }

        stats.elapsed = started.elapsed();
        self.state = RunnerState::Done;
        self.reporter.finish(&stats);
        Ok(stats)
    }

    fn run_item(&mut self, position: usize, total: usize, item: &WorkItem, output_dir: &Path) -> ProcessingOutcome {
        let manifest = self.config.manifest.resolve(item);

        if should_skip(output_dir, &manifest, self.config.ignore_existing) {
            self.state = RunnerState::Skipping;
            return ProcessingOutcome::Skipped(SKIP_EXISTING.to_string());
        }

        self.state = RunnerState::Processing;
        self.reporter.item_started(position, total, item);

        let ctx = ProcessContext {
            stage: &self.config.stage,
            output_dir,
            manifest: &manifest,
            params: &self.config.params,
        };

        let processor = self.processor;
        let result = panic::catch_unwind(AssertUnwindSafe(|| processor.process(item, &ctx)))
            .unwrap_or_else(|payload| Err(StageError::Panicked(panic_message(payload.as_ref()))));

        match result {
            Ok(artifacts) => {
                let missing = missing_artifacts(output_dir, &manifest);
                if !missing.is_empty() {
                    log::warn!(
                        "{} reported success for '{}' but {} missing; it will be retried on resume",
                        self.processor.name(),
                        item.identifier(),
                        missing.join(", ")
                    );
                }
                ProcessingOutcome::Success(artifacts)
            }
            Err(e) => ProcessingOutcome::Failed(e.to_string()),
        }
    }
}

/// Pre-loop validation plus discovery. Nothing has been processed if this fails.
pub fn prepare(config: &RunConfig, discoverer: &dyn Discoverer) -> Result<Vec<WorkItem>, EngineError> {
    config.validate()?;

    if !config.src_dir.is_dir() {
        return Err(EngineError::SourceNotFound(config.src_dir.clone()));
    }

    fs::create_dir_all(&config.tgt_dir).map_err(|source| EngineError::TargetDir {
        path: config.tgt_dir.clone(),
        source,
    })?;

    let _timer = ScopedTimer::new("discovery");
    Ok(discoverer.discover(&config.src_dir)?)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputCollision {
    pub path: PathBuf,
    pub first: String,
    pub second: String,
}

/// Items whose resolved artifacts land on the same path, named by relative key.
pub fn output_collisions(config: &RunConfig, items: &[WorkItem]) -> Vec<OutputCollision> {
    let mut owners: HashMap<PathBuf, &str> = HashMap::new();
    let mut collisions = Vec::new();

    for item in items {
        let dir = config.layout.output_dir(&config.tgt_dir, item);
        for artifact in config.manifest.resolve(item).artifacts() {
            match owners.entry(dir.join(artifact)) {
                Entry::Occupied(entry) => {
                    if *entry.get() != item.relative_key() {
                        collisions.push(OutputCollision {
                            path: entry.key().clone(),
                            first: entry.get().to_string(),
                            second: item.relative_key().to_string(),
                        });
                    }
                }
                Entry::Vacant(entry) => {
                    entry.insert(item.relative_key());
                }
            }
        }
    }
    collisions
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
