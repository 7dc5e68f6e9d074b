// Mon Feb 02 2026 - Alex

use crate::engine::item::WorkItem;
use crate::engine::result::ProcessingOutcome;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedItem {
    pub identifier: String,
    pub source: String,
    pub error: String,
}

/// Counters for one worker's run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub discovered: usize,
    pub selected: usize,
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub failures: Vec<FailedItem>,
    #[serde(with = "duration_secs")]
    pub elapsed: Duration,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, item: &WorkItem, outcome: &ProcessingOutcome) {
        match outcome {
            ProcessingOutcome::Success(_) => self.processed += 1,
            ProcessingOutcome::Skipped(_) => self.skipped += 1,
            ProcessingOutcome::Failed(error) => {
                self.failed += 1;
                self.failures.push(FailedItem {
                    identifier: item.identifier().to_string(),
                    source: item.source().display().to_string(),
                    error: error.clone(),
                });
            }
        }
    }

    /// Items that went through the loop so far.
    pub fn attempted(&self) -> usize {
        self.processed + self.skipped + self.failed
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    pub fn summary_line(&self) -> String {
        format!(
            "stats | processed: {} skipped: {} failed: {}",
            self.processed, self.skipped, self.failed
        )
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Ok(Duration::from_secs_f64(secs.max(0.0)))
    }
}
