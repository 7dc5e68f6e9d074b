// Tue Feb 03 2026 - Alex

use crate::engine::item::WorkItem;
use crate::engine::stage::{ProcessContext, StageError, StageProcessor, StageResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Copies each item's source file into the output directory under its file
/// name, keeping the modification time.
#[derive(Debug, Clone, Default)]
pub struct CopyProcessor;

impl CopyProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl StageProcessor for CopyProcessor {
    fn name(&self) -> &str {
        "copy"
    }

    fn process(&self, item: &WorkItem, ctx: &ProcessContext<'_>) -> StageResult<Vec<String>> {
        let source = item.source();
        if !source.is_file() {
            return Err(StageError::MissingSource(source.to_path_buf()));
        }

        fs::create_dir_all(ctx.output_dir)?;

        let file_name = item.file_name();
        let dest = ctx.output_dir.join(&file_name);
        let partial = ctx.output_dir.join(format!(".{}.tmp", file_name));

        if let Err(e) = copy_into_place(source, &partial, &dest) {
            fs::remove_file(&partial).ok();
            return Err(e.into());
        }

        Ok(vec![file_name])
    }
}

// The destination name only appears once the bytes and mtime are final, so an
// interrupted copy never satisfies the manifest.
fn copy_into_place(source: &Path, partial: &Path, dest: &Path) -> std::io::Result<()> {
    fs::copy(source, partial)?;

    let modified = fs::metadata(source)?.modified()?;
    fs::File::options().write(true).open(partial)?.set_modified(modified)?;

    fs::rename(partial, dest)
}

/// Which listed names exist under the source root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListCheck {
    pub total: usize,
    pub existing: Vec<String>,
    pub missing: Vec<String>,
}

impl ListCheck {
    pub fn run(names: &[String], src_dir: &Path) -> Self {
        let (existing, missing): (Vec<String>, Vec<String>) =
            names.iter().cloned().partition(|name| src_dir.join(name).is_file());

        Self {
            total: names.len(),
            existing,
            missing,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.missing.is_empty()
    }

    /// Counts followed by the names that were found. Missing names are left to
    /// the caller, which prints them on stderr.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "total: {}\nexisting: {}\nmissing: {}\n",
            self.total,
            self.existing.len(),
            self.missing.len()
        );
        if !self.existing.is_empty() {
            out.push_str("\nexisting names:\n");
            for name in &self.existing {
                out.push_str(name);
                out.push('\n');
            }
        }
        out
    }
}
