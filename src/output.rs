// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet (CI), and JSON output modes.

use crate::orchestrate::{DeployReport, DeployStatus};
use serde::Serialize;
use std::time::Instant;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Minimal output for CI (only the final status line)
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
///
/// The deployer's own output is streamed live by the runner and is not
/// routed through this layer.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    /// Start timing the run.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    fn elapsed_secs(&self) -> Option<f64> {
        self.start_time.map(|t| t.elapsed().as_secs_f64())
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Print the terminal result of a run.
    pub fn report(&self, report: &DeployReport) {
        match self.mode {
            OutputMode::Normal => {
                match (&report.status, &report.failure) {
                    (DeployStatus::Success, _) => {
                        if let Some(elapsed) = self.elapsed_secs() {
                            println!("Deployment successful ({elapsed:.1}s)");
                        } else {
                            println!("Deployment successful");
                        }
                    }
                    (DeployStatus::Failed, Some(reason)) => {
                        eprintln!("Error: {reason}");
                    }
                    (DeployStatus::Failed, None) => {
                        eprintln!("Error: deployment failed");
                    }
                }
                println!("deployment-status={}", report.status);
            }
            OutputMode::Quiet => {
                println!("deployment-status={}", report.status);
            }
            OutputMode::Json => {
                let status = report.status.to_string();
                let event = JsonEvent {
                    event: "result",
                    status: &status,
                    deployer_output: &report.output,
                    failure: report.failure.as_deref(),
                    duration_secs: self.elapsed_secs(),
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    println!("{json}");
                }
            }
        }
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    status: &'a str,
    deployer_output: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}
