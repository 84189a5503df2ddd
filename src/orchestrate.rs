// ABOUTME: Sequences one deployment run from credentials to cleanup.
// ABOUTME: Cleanup is guaranteed on every path and never masks the primary failure.

use crate::error::{Error, Result};
use crate::output::Output;
use crate::runner;
use crate::session::{self, SessionArtifacts, SessionContext};
use crate::shellwords;
use crate::types::{DeployCommand, Environment, Revision, Verbosity};
use crate::verify;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Inputs for one deployment run, string-typed at the boundary.
#[derive(Debug, Clone)]
pub struct DeployRequest {
    /// SSH private key content (never logged).
    pub private_key: String,
    pub environment: String,
    pub revision: String,
    /// Deployer binary path relative to the working directory.
    pub deployer_bin: String,
    pub known_hosts: Option<String>,
    pub port: u16,
    pub working_dir: PathBuf,
    pub verbosity: Option<String>,
    /// Free-form extra options, split with quote-aware tokenization.
    pub options: String,
    /// Timeout in milliseconds; must parse as a positive integer if present.
    pub timeout_ms: Option<String>,
}

/// Terminal status of a run. Always set, whatever happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployStatus {
    Success,
    Failed,
}

impl fmt::Display for DeployStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployStatus::Success => write!(f, "success"),
            DeployStatus::Failed => write!(f, "failed"),
        }
    }
}

/// What a run reports back: status, the full captured deployer output, and
/// the primary failure message when the status is failed.
#[derive(Debug)]
pub struct DeployReport {
    pub status: DeployStatus,
    pub output: String,
    pub failure: Option<String>,
}

struct Failure {
    error: Error,
    output: String,
}

impl Failure {
    fn bare(error: impl Into<Error>) -> Self {
        Self {
            error: error.into(),
            output: String::new(),
        }
    }
}

/// Run one deployment end to end.
///
/// Sequence: session begin → binary verification → timeout validation →
/// deployment run. Whatever the outcome, cleanup runs on every artifact the
/// session managed to create before the report is produced; cleanup failures
/// are logged at debug level and never replace the primary error.
pub async fn deploy(request: &DeployRequest, output: &Output) -> DeployReport {
    let mut artifacts = match SessionArtifacts::prepare() {
        Ok(artifacts) => artifacts,
        Err(e) => {
            // Nothing was created, nothing to clean.
            return failed_report(e, String::new());
        }
    };

    let outcome = execute(request, &mut artifacts, output).await;

    output.progress("Cleaning up SSH artifacts...");
    session::cleanup(&artifacts).await;

    match outcome {
        Ok(run_output) => DeployReport {
            status: DeployStatus::Success,
            output: run_output,
            failure: None,
        },
        Err(failure) => failed_report(failure.error, failure.output),
    }
}

async fn execute(
    request: &DeployRequest,
    artifacts: &mut SessionArtifacts,
    output: &Output,
) -> std::result::Result<String, Failure> {
    let environment = Environment::new(&request.environment).map_err(Failure::bare)?;
    let revision = Revision::new(&request.revision).map_err(Failure::bare)?;
    let verbosity = request
        .verbosity
        .as_deref()
        .map(str::parse::<Verbosity>)
        .transpose()
        .map_err(Failure::bare)?;

    output.progress("Setting up SSH session...");
    let ctx = session::begin(
        artifacts,
        &request.private_key,
        request.known_hosts.as_deref(),
        request.port,
    )
    .await
    .map_err(Failure::bare)?;

    output.progress("Verifying deployer binary...");
    let binary = verify::verify(
        Path::new(&request.deployer_bin),
        &request.working_dir,
        &ctx,
    )
    .await
    .map_err(Failure::bare)?;

    let timeout = parse_timeout(request.timeout_ms.as_deref()).map_err(Failure::bare)?;

    output.progress(&format!("Deploying {environment} at {revision}..."));
    run_deployer(&binary, &environment, &revision, verbosity, request, &ctx, timeout).await
}

async fn run_deployer(
    binary: &Path,
    environment: &Environment,
    revision: &Revision,
    verbosity: Option<Verbosity>,
    request: &DeployRequest,
    ctx: &SessionContext,
    timeout: Option<Duration>,
) -> std::result::Result<String, Failure> {
    let command = DeployCommand::new(
        environment,
        revision,
        verbosity,
        shellwords::split(&request.options),
    );

    match runner::run(binary, &command, &request.working_dir, ctx, timeout).await {
        Ok(result) => Ok(result.output),
        Err(runner::Error::Failed { exit_code, output }) => Err(Failure {
            error: Error::DeploymentFailed { exit_code },
            output,
        }),
        Err(runner::Error::TimedOut { limit, output }) => Err(Failure {
            error: Error::DeploymentTimeout(limit),
            output,
        }),
        Err(runner::Error::Launch(e)) => Err(Failure::bare(e)),
    }
}

/// A timeout is configuration: present means a positive integer of
/// milliseconds, anything else is rejected before the deployer starts.
fn parse_timeout(raw: Option<&str>) -> Result<Option<Duration>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    let ms = trimmed
        .parse::<i64>()
        .map_err(|_| Error::InvalidTimeout(trimmed.to_string()))?;
    if ms <= 0 {
        return Err(Error::InvalidTimeout(trimmed.to_string()));
    }
    Ok(Some(Duration::from_millis(ms as u64)))
}

fn failed_report(error: Error, run_output: String) -> DeployReport {
    tracing::debug!("deployment failed: {error}");
    DeployReport {
        status: DeployStatus::Failed,
        output: run_output,
        failure: Some(error.to_string()),
    }
}
