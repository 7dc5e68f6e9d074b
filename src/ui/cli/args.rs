// Wed Feb 04 2026 - Alex

use crate::config::JobFile;
use crate::engine::error::EngineError;
use crate::stages::{parse_param, StageKind, StageOptions};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "shardprep")]
#[command(author = "Alex")]
#[command(version = "1.0.0")]
#[command(about = "Sharded, resumable batch runner for 3D dataset preprocessing", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true, default_value = "info")]
    pub log_level: String,

    #[arg(long, global = true)]
    pub no_color: bool,

    /// Show a progress bar instead of one log line per item
    #[arg(long, global = true)]
    pub progress: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Process this worker's shard of the corpus
    Run(RunArgs),
    /// Report which items of this shard are still incomplete
    Check(CheckArgs),
    /// Check or copy the files named in a JSON list
    List(ListArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct ShardArgs {
    #[arg(long = "num_shards", alias = "num-shards", default_value_t = 1)]
    pub num_shards: u32,

    #[arg(long = "shard_index", alias = "shard-index", default_value_t = 0)]
    pub shard_index: u32,

    /// Skip items whose outputs are already complete
    #[arg(long = "ignore_existing", alias = "ignore-existing")]
    pub ignore_existing: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct SelectionArgs {
    #[arg(long, value_enum)]
    pub stage: Option<StageKind>,

    #[arg(long = "src_dir", alias = "src-dir")]
    pub src_dir: PathBuf,

    #[arg(long = "tgt_dir", alias = "tgt-dir")]
    pub tgt_dir: PathBuf,

    #[command(flatten)]
    pub shard: ShardArgs,

    /// Input file extension, e.g. .glb
    #[arg(long)]
    pub ext: Option<String>,

    /// Treat every directory containing this file as one item
    #[arg(long)]
    pub sentinel: Option<String>,

    /// JSON array of item names (files or part folders) relative to --src_dir
    #[arg(long, conflicts_with_all = ["ext", "sentinel"])]
    pub json: Option<PathBuf>,

    /// Artifact that must exist for an item to count as done (repeatable)
    #[arg(long = "require")]
    pub require: Vec<String>,

    /// External program run once per item
    #[arg(long)]
    pub command: Option<String>,

    /// Argument template for --command; {src} {out} {id} {key} are substituted
    #[arg(long = "arg", allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Stage parameter as name=value (repeatable)
    #[arg(long = "param", value_parser = parse_param)]
    pub params: Vec<(String, String)>,

    /// File name of the per-item JSON sidecar
    #[arg(long, conflicts_with = "no_sidecar")]
    pub sidecar: Option<String>,

    #[arg(long = "no-sidecar", alias = "no_sidecar")]
    pub no_sidecar: bool,

    /// JSON job file; command-line flags take precedence
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Write a JSON run report here when the run ends
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Exit with status 3 when any item failed
    #[arg(long)]
    pub strict: bool,
}

#[derive(Parser, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Exit with status 3 when any item is incomplete
    #[arg(long)]
    pub strict: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    Check,
    Copy,
}

#[derive(Parser, Debug)]
pub struct ListArgs {
    /// JSON array of file names relative to --src_dir
    #[arg(long)]
    pub json: PathBuf,

    #[arg(long = "src_dir", alias = "src-dir")]
    pub src_dir: PathBuf,

    #[arg(long = "tgt_dir", alias = "tgt-dir")]
    pub tgt_dir: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ListMode::Check)]
    pub mode: ListMode,

    /// Exit with status 3 when names are missing (check) or copies failed (copy)
    #[arg(long)]
    pub strict: bool,

    #[command(flatten)]
    pub shard: ShardArgs,
}

impl SelectionArgs {
    /// Flags layered over the job file, if one was given.
    pub fn into_options(self) -> Result<StageOptions, EngineError> {
        let job = self.config.as_deref().map(JobFile::load).transpose()?;

        let opts = StageOptions {
            stage: self.stage,
            src_dir: self.src_dir,
            tgt_dir: self.tgt_dir,
            num_shards: self.shard.num_shards,
            shard_index: self.shard.shard_index,
            ignore_existing: self.shard.ignore_existing,
            ext: self.ext,
            sentinel: self.sentinel,
            list: self.json,
            require: self.require,
            command: self.command,
            args: self.args,
            params: self.params,
            sidecar: self.sidecar,
            no_sidecar: self.no_sidecar,
        };

        Ok(match job {
            Some(job) => opts.layer_job(job),
            None => opts,
        })
    }
}

impl ListArgs {
    pub fn validate(&self) -> Result<(), String> {
        if self.mode == ListMode::Copy && self.tgt_dir.is_none() {
            return Err("--tgt_dir is required for --mode copy".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("shardprep").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_run_accepts_underscore_and_kebab_flags() {
        let args = parse(&[
            "run", "--stage", "points", "--src_dir", "/glb", "--tgt-dir", "/out",
            "--num_shards", "4", "--shard-index", "3", "--ignore_existing",
            "--command", "python", "--arg", "sample.py", "--arg", "-v",
        ]);

        let Command::Run(run) = args.command else {
            panic!("expected run");
        };
        let sel = run.selection;
        assert_eq!(sel.stage, Some(StageKind::Points));
        assert_eq!(sel.src_dir, PathBuf::from("/glb"));
        assert_eq!(sel.tgt_dir, PathBuf::from("/out"));
        assert_eq!((sel.shard.num_shards, sel.shard.shard_index), (4, 3));
        assert!(sel.shard.ignore_existing);
        assert_eq!(sel.args, vec!["sample.py", "-v"]);
    }

    #[test]
    fn test_defaults_and_globals() {
        let args = parse(&["check", "--stage", "iou", "--src_dir", "a", "--tgt_dir", "b", "--log-level", "debug", "--progress"]);
        assert_eq!(args.log_level, "debug");
        assert!(args.progress);
        assert!(!args.no_color);

        let Command::Check(check) = args.command else {
            panic!("expected check");
        };
        assert_eq!(check.selection.shard.num_shards, 1);
        assert_eq!(check.selection.shard.shard_index, 0);
        assert!(!check.strict);
    }

    #[test]
    fn test_params_are_parsed() {
        let args = parse(&[
            "run", "--stage", "render", "--src_dir", "a", "--tgt_dir", "b",
            "--param", "radius=3.5", "--param", "image-size=512x512",
        ]);
        let Command::Run(run) = args.command else {
            panic!("expected run");
        };
        assert_eq!(
            run.selection.params,
            vec![
                ("radius".to_string(), "3.5".to_string()),
                ("image_size".to_string(), "512x512".to_string())
            ]
        );

        let bad = Args::try_parse_from(["shardprep", "run", "--src_dir", "a", "--tgt_dir", "b", "--param", "radius"]);
        assert!(bad.is_err());
    }

    #[test]
    fn test_unknown_stage_and_missing_dirs_rejected() {
        assert!(Args::try_parse_from(["shardprep", "run", "--stage", "mesh", "--src_dir", "a", "--tgt_dir", "b"]).is_err());
        assert!(Args::try_parse_from(["shardprep", "run", "--stage", "points", "--src_dir", "a"]).is_err());
        assert!(Args::try_parse_from([
            "shardprep", "run", "--src_dir", "a", "--tgt_dir", "b", "--sidecar", "x.json", "--no-sidecar"
        ])
        .is_err());
    }

    #[test]
    fn test_merge_takes_json_list() {
        let args = parse(&[
            "run", "--stage", "merge", "--json", "ids.json", "--src_dir", "parts", "--tgt_dir", "merged",
            "--command", "python", "--arg", "merge.py", "--arg", "{src}", "--arg", "{out}/{id}.glb",
        ]);
        let Command::Run(run) = args.command else {
            panic!("expected run");
        };
        assert_eq!(run.selection.stage, Some(StageKind::Merge));
        assert_eq!(run.selection.json, Some(PathBuf::from("ids.json")));

        assert!(Args::try_parse_from([
            "shardprep", "run", "--src_dir", "a", "--tgt_dir", "b", "--json", "ids.json", "--ext", ".glb"
        ])
        .is_err());
    }

    #[test]
    fn test_list_mode() {
        let args = parse(&["list", "--json", "names.json", "--src_dir", "imgs", "--mode", "copy"]);
        let Command::List(list) = args.command else {
            panic!("expected list");
        };
        assert_eq!(list.mode, ListMode::Copy);
        assert!(list.validate().is_err());

        let args = parse(&["list", "--json", "names.json", "--src_dir", "imgs"]);
        let Command::List(list) = args.command else {
            panic!("expected list");
        };
        assert_eq!(list.mode, ListMode::Check);
        assert!(list.validate().is_ok());
    }

    #[test]
    fn test_into_options_layers_job_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let job = dir.path().join("job.json");
        std::fs::write(&job, r#"{"stage": "iou", "command": "python", "args": ["iou.py", "{src}"]}"#).unwrap();
        let job = job.display().to_string();

        let args = parse(&["run", "--src_dir", "a", "--tgt_dir", "b", "--config", job.as_str(), "--command", "python3"]);
        let Command::Run(run) = args.command else {
            panic!("expected run");
        };
        let opts = run.selection.into_options().unwrap();
        assert_eq!(opts.stage, Some(StageKind::Iou));
        assert_eq!(opts.command.as_deref(), Some("python3"));
        assert_eq!(opts.args, vec!["iou.py", "{src}"]);
    }
}
