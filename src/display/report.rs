//! JSON output for profile reports.

use crate::profile::{ProfileReport, RunOutcome};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Printed instead of a report when the run could not start
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorOutput {
    pub status: String,
    pub error: String,
}

/// Formats profile reports as JSON
pub struct ReportFormatter {
    pretty: bool,
}

impl ReportFormatter {
    pub fn new() -> Self {
        Self { pretty: false }
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    pub fn format(&self, report: &ProfileReport) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };
        Ok(json)
    }

    /// Creates error output; the full context chain goes into the message
    pub fn create_error_output(error: anyhow::Error) -> ErrorOutput {
        ErrorOutput {
            status: "error".to_string(),
            error: format!("{:#}", error),
        }
    }
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Process exit code for a finished run
pub fn exit_code(outcome: RunOutcome) -> u8 {
    match outcome {
        RunOutcome::Passed => 0,
        RunOutcome::Failed => 1,
        RunOutcome::Errored => 2,
    }
}
