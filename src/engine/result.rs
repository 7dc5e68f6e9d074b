// Mon Feb 02 2026 - Alex

use serde::{Deserialize, Serialize};

/// What happened to one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum ProcessingOutcome {
    Success(Vec<String>),
    Skipped(String),
    Failed(String),
}

impl ProcessingOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ProcessingOutcome::Success(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ProcessingOutcome::Failed(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, ProcessingOutcome::Skipped(_))
    }

    pub fn artifacts(&self) -> &[String] {
        match self {
            ProcessingOutcome::Success(artifacts) => artifacts,
            _ => &[],
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ProcessingOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn skip_reason(&self) -> Option<&str> {
        match self {
            ProcessingOutcome::Skipped(reason) => Some(reason),
            _ => None,
        }
    }
}
