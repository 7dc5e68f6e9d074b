// Mon Feb 02 2026 - Alex

pub mod report;
pub mod sidecar;
pub mod stats;

pub use report::{log_summary, write_report, LogReporter, RunReport, RunReporter};
pub use sidecar::Sidecar;
pub use stats::{FailedItem, RunStats};
