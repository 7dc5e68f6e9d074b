// Tue Feb 03 2026 - Alex

use crate::engine::item::WorkItem;
use crate::engine::stage::{ProcessContext, StageError, StageProcessor, StageResult};
use crate::output::sidecar::Sidecar;
use crate::utils::tail_lines;
use std::fs;
use std::process::{Command, Stdio};

const STDERR_TAIL_LINES: usize = 5;

/// Runs an external stage tool once per item.
///
/// Argument templates understand `{src}`, `{out}`, `{id}` and `{key}`.
/// Stage parameters follow as `--<name> <value>` pairs. The same values are
/// exported as `SHARDPREP_SRC`, `SHARDPREP_OUT`, `SHARDPREP_ID` and
/// `SHARDPREP_KEY` for tools that prefer the environment.
#[derive(Debug, Clone)]
pub struct CommandProcessor {
    name: String,
    program: String,
    args: Vec<String>,
    sidecar: Option<String>,
}

impl CommandProcessor {
    pub fn new(name: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args: vec!["{src}".to_string(), "{out}".to_string()],
            sidecar: None,
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        if !args.is_empty() {
            self.args = args;
        }
        self
    }

    pub fn with_sidecar(mut self, sidecar: Option<String>) -> Self {
        self.sidecar = sidecar;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn sidecar(&self) -> Option<&str> {
        self.sidecar.as_deref()
    }

    pub fn render_args(&self, item: &WorkItem, ctx: &ProcessContext<'_>) -> Vec<String> {
        let src = item.source().display().to_string();
        let out = ctx.output_dir.display().to_string();

        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|a| {
                a.replace("{src}", &src)
                    .replace("{out}", &out)
                    .replace("{id}", item.identifier())
                    .replace("{key}", item.relative_key())
            })
            .collect();

        for (name, value) in ctx.params {
            args.push(format!("--{}", name));
            args.push(value.clone());
        }
        args
    }
}

impl StageProcessor for CommandProcessor {
    fn name(&self) -> &str {
        &self.name
    }

    fn process(&self, item: &WorkItem, ctx: &ProcessContext<'_>) -> StageResult<Vec<String>> {
        fs::create_dir_all(ctx.output_dir)?;

        let args = self.render_args(item, ctx);
        log::debug!("exec: {} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(&args)
            .env("SHARDPREP_SRC", item.source())
            .env("SHARDPREP_OUT", ctx.output_dir)
            .env("SHARDPREP_ID", item.identifier())
            .env("SHARDPREP_KEY", item.relative_key())
            .stdin(Stdio::null())
            .output()
            .map_err(|source| StageError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(StageError::CommandFailed {
                status: output.status.to_string(),
                stderr: tail_lines(&String::from_utf8_lossy(&output.stderr), STDERR_TAIL_LINES),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            log::debug!("{} stdout: {}", item.identifier(), tail_lines(&stdout, STDERR_TAIL_LINES));
        }

        let mut written: Vec<String> = ctx
            .manifest
            .artifacts()
            .filter(|name| ctx.output_dir.join(name).exists())
            .map(str::to_string)
            .collect();

        if let Some(sidecar) = &self.sidecar {
            Sidecar::new(ctx.stage, item, ctx.params).write(ctx.output_dir, sidecar)?;
            written.push(sidecar.clone());
        }

        Ok(written)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::engine::manifest::OutputManifest;
    use crate::engine::stage::StageParams;
    use std::path::Path;
    use tempfile::TempDir;

    fn ctx<'a>(out: &'a Path, manifest: &'a OutputManifest, params: &'a StageParams) -> ProcessContext<'a> {
        ProcessContext {
            stage: "render",
            output_dir: out,
            manifest,
            params,
        }
    }

    #[test]
    fn test_render_args_substitutes_and_appends_params() {
        let item = WorkItem::new("chair", "/src/objs/chair.glb", "objs/chair.glb");
        let manifest = OutputManifest::new(["rendering.png"]).unwrap();
        let mut params = StageParams::new();
        params.insert("radius".to_string(), "4.0".to_string());

        let processor = CommandProcessor::new("render", "python")
            .with_args(vec!["render.py".into(), "--mesh={src}".into(), "{out}".into(), "{id}:{key}".into()]);
        let args = processor.render_args(&item, &ctx(Path::new("/out/chair"), &manifest, &params));

        assert_eq!(
            args,
            vec!["render.py", "--mesh=/src/objs/chair.glb", "/out/chair", "chair:objs/chair.glb", "--radius", "4.0"]
        );
    }

    #[test]
    fn test_successful_command_writes_artifacts_and_sidecar() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("chair");
        let item = WorkItem::new("chair", dir.path().join("chair.glb"), "chair.glb");
        let manifest = OutputManifest::new(["rendering.png"]).unwrap();
        let params = StageParams::new();

        let processor = CommandProcessor::new("render", "sh")
            .with_args(vec!["-c".into(), "echo png > \"$SHARDPREP_OUT/rendering.png\"".into()])
            .with_sidecar(Some("render_cfg.json".to_string()));

        let written = processor.process(&item, &ctx(&out, &manifest, &params)).unwrap();

        assert_eq!(written, vec!["rendering.png", "render_cfg.json"]);
        assert!(out.join("rendering.png").exists());
        let sidecar = Sidecar::read(&out.join("render_cfg.json")).unwrap();
        assert_eq!(sidecar.relative_key, "chair.glb");
    }

    #[test]
    fn test_nonzero_exit_is_an_item_error() {
        let dir = TempDir::new().unwrap();
        let item = WorkItem::new("bad", dir.path().join("bad.glb"), "bad.glb");
        let manifest = OutputManifest::new(["iou.json"]).unwrap();
        let params = StageParams::new();

        let processor = CommandProcessor::new("iou", "sh")
            .with_args(vec!["-c".into(), "echo 'Traceback' >&2; echo 'ValueError: empty scene' >&2; exit 3".into()]);
        let err = processor
            .process(&item, &ctx(&dir.path().join("bad"), &manifest, &params))
            .unwrap_err();

        match err {
            StageError::CommandFailed { status, stderr } => {
                assert!(status.contains('3'));
                assert!(stderr.ends_with("ValueError: empty scene"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_missing_program() {
        let dir = TempDir::new().unwrap();
        let item = WorkItem::new("a", dir.path().join("a.glb"), "a.glb");
        let manifest = OutputManifest::new(["x"]).unwrap();
        let params = StageParams::new();

        let err = CommandProcessor::new("points", "/definitely/not/a/program")
            .process(&item, &ctx(&dir.path().join("a"), &manifest, &params))
            .unwrap_err();
        assert!(matches!(err, StageError::Spawn { .. }));
    }
}
