// Wed Feb 04 2026 - Alex

use super::args::{Args, CheckArgs, Command, ListArgs, ListMode, RunArgs};
use crate::config::RunConfig;
use crate::engine::check::check_shard;
use crate::engine::error::EngineError;
use crate::engine::item::OutputLayout;
use crate::engine::manifest::OutputManifest;
use crate::engine::runner::ShardRunner;
use crate::engine::shard::ShardSpec;
use crate::engine::stage::StageProcessor;
use crate::orchestration::discovery::{Discoverer, ListDiscoverer};
use crate::output::report::{write_report, LogReporter, RunReport, RunReporter};
use crate::output::stats::RunStats;
use crate::stages::{CopyProcessor, ListCheck, StagePlan, StageSelection};
use crate::ui::progress::ProgressReporter;
use crate::utils::logging::{init_logging, LoggingUtils};
use anyhow::Context;
use colored::Colorize;

/// How a command that did not hit a configuration error ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    /// `--strict` and something is left to do.
    Unresolved,
}

impl Status {
    pub fn code(self) -> u8 {
        match self {
            Status::Success => 0,
            Status::Unresolved => 3,
        }
    }
}

#[derive(Debug, Default)]
pub struct CommandHandler {
    progress: bool,
}

impl CommandHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn execute(&mut self, args: Args) -> anyhow::Result<Status> {
        self.setup_logging(&args);
        self.progress = args.progress;

        match args.command {
            Command::Run(run_args) => self.handle_run(run_args),
            Command::Check(check_args) => self.handle_check(check_args),
            Command::List(list_args) => self.handle_list(list_args),
        }
    }

    fn setup_logging(&self, args: &Args) {
        if args.no_color {
            colored::control::set_override(false);
        }
        init_logging(LoggingUtils::level_from_str(&args.log_level), !args.no_color);
    }

    fn run_engine(
        &self,
        config: &RunConfig,
        processor: &dyn StageProcessor,
        discoverer: &dyn Discoverer,
    ) -> Result<RunStats, EngineError> {
        if self.progress {
            drive(config, processor, discoverer, &mut ProgressReporter::new())
        } else {
            drive(config, processor, discoverer, &mut LogReporter::new())
        }
    }

    fn handle_run(&self, args: RunArgs) -> anyhow::Result<Status> {
        let opts = args.selection.into_options()?;
        let plan = StagePlan::build(opts)?;
        log::debug!("{:?}", plan);

        let stats = self.run_engine(&plan.config, plan.processor.as_ref(), plan.discoverer.as_ref())?;

        if let Some(path) = &args.report {
            write_report(path, &RunReport::new(&plan.config, &stats))
                .with_context(|| format!("writing run report {}", path.display()))?;
            log::info!("report written to {}", path.display());
        }

        Ok(if args.strict && stats.has_failures() {
            Status::Unresolved
        } else {
            Status::Success
        })
    }

    fn handle_check(&self, args: CheckArgs) -> anyhow::Result<Status> {
        let opts = args.selection.into_options()?;
        let selection = StageSelection::build(&opts)?;
        let report = check_shard(&selection.config, selection.discoverer.as_ref())?;

        println!(
            "{} shard {}: {}/{} complete ({} discovered)",
            "[*]".blue(),
            selection.config.shard,
            report.complete.len(),
            report.selected(),
            report.discovered
        );
        for item in &report.incomplete {
            println!("  {} {} missing: {}", "[-]".yellow(), item.identifier, item.missing.join(", "));
        }
        if report.is_resolved() {
            println!("{} nothing left to do", "[+]".green());
        }

        Ok(if args.strict && !report.is_resolved() {
            Status::Unresolved
        } else {
            Status::Success
        })
    }

    fn handle_list(&self, args: ListArgs) -> anyhow::Result<Status> {
        args.validate().map_err(|e| anyhow::anyhow!(e))?;
        let discoverer = ListDiscoverer::new(&args.json);

        match (args.mode, args.tgt_dir) {
            (ListMode::Check, _) => {
                if !args.src_dir.is_dir() {
                    return Err(EngineError::SourceNotFound(args.src_dir).into());
                }
                let names = discoverer.load_names()?;
                let check = ListCheck::run(&names, &args.src_dir);

                print!("{}", check.summary());
                if !check.missing.is_empty() {
                    eprintln!("\n{}", "missing names:".red());
                    for name in &check.missing {
                        eprintln!("{}", name);
                    }
                }

                Ok(if args.strict && !check.is_resolved() {
                    Status::Unresolved
                } else {
                    Status::Success
                })
            }
            (ListMode::Copy, Some(tgt_dir)) => {
                let config = RunConfig::new("copy", args.src_dir, tgt_dir, OutputManifest::new(["{name}"])?)
                    .with_shard(ShardSpec::new(args.shard.num_shards, args.shard.shard_index)?)
                    .with_ignore_existing(args.shard.ignore_existing)
                    .with_layout(OutputLayout::Flat);

                let stats = self.run_engine(&config, &CopyProcessor::new(), &discoverer)?;

                Ok(if args.strict && stats.has_failures() {
                    Status::Unresolved
                } else {
                    Status::Success
                })
            }
            (ListMode::Copy, None) => Err(anyhow::anyhow!("--tgt_dir is required for --mode copy")),
        }
    }
}

fn drive(
    config: &RunConfig,
    processor: &dyn StageProcessor,
    discoverer: &dyn Discoverer,
    reporter: &mut dyn RunReporter,
) -> Result<RunStats, EngineError> {
    ShardRunner::new(config, processor, reporter).run(discoverer)
}

/// Prints a fatal error and its cause chain to stderr.
pub fn report_error(err: &anyhow::Error) {
    eprintln!("{} {}", "error:".red().bold(), err);
    for cause in err.chain().skip(1) {
        eprintln!("  {} {}", "caused by:".yellow(), cause);
    }
}
