// Wed Feb 04 2026 - Alex

use crate::config::RunConfig;
use crate::engine::item::WorkItem;
use crate::engine::result::ProcessingOutcome;
use crate::output::report::{log_summary, RunReporter};
use crate::output::stats::RunStats;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

const BAR_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}";

/// Progress bar over the selected items. Failures are printed above the bar
/// so they survive the redraw.
pub struct ProgressReporter {
    bar: Option<ProgressBar>,
    stage: String,
    hidden: bool,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            bar: None,
            stage: String::new(),
            hidden: false,
        }
    }

    /// Draws nothing; used where there is no terminal.
    pub fn hidden() -> Self {
        Self {
            hidden: true,
            ..Self::new()
        }
    }

    fn create_bar(&self, total: u64) -> ProgressBar {
        if self.hidden {
            return ProgressBar::hidden();
        }

        let style = ProgressStyle::default_bar()
            .template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░ ");

        let bar = ProgressBar::new(total);
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(120));
        bar
    }

    pub fn position(&self) -> u64 {
        self.bar.as_ref().map(|b| b.position()).unwrap_or(0)
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl RunReporter for ProgressReporter {
    fn run_started(&mut self, config: &RunConfig, discovered: usize, selected: usize) {
        self.stage = config.stage.clone();
        log::info!(
            "[{}] discovered {} items, this shard selected {} (index={})",
            self.stage, discovered, selected, config.shard
        );
        self.bar = Some(self.create_bar(selected as u64));
    }

    fn item_started(&mut self, _position: usize, _total: usize, item: &WorkItem) {
        if let Some(bar) = &self.bar {
            bar.set_message(item.identifier().to_string());
        }
    }

    fn item_finished(
        &mut self,
        _position: usize,
        _total: usize,
        item: &WorkItem,
        _output_dir: &Path,
        outcome: &ProcessingOutcome,
    ) {
        let Some(bar) = &self.bar else {
            return;
        };

        if let ProcessingOutcome::Failed(error) = outcome {
            bar.println(format!("{} {} | {}", "failed:".red().bold(), item.source().display(), error));
        }
        bar.inc(1);
    }

    fn finish(&mut self, stats: &RunStats) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
        log_summary(&self.stage, stats);
    }
}
