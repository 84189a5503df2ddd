// ABOUTME: Application-wide error types for stelo.
// ABOUTME: Uses thiserror for ergonomic error handling.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error(transparent)]
    PathEscape(#[from] crate::pathguard::Error),

    #[error("deployer binary not found: {0}")]
    NotFound(PathBuf),

    #[error("cannot make {path} executable: {source}")]
    Permission {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("deployer verification failed: {0}")]
    VerificationFailed(String),

    #[error("cannot parse ssh-agent output: {0}")]
    AgentParse(String),

    #[error("failed to register key with ssh-agent: {0}")]
    KeyRegistration(String),

    #[error("deployment failed with exit code {exit_code}")]
    DeploymentFailed { exit_code: i32 },

    #[error("deployment timed out after {0:?}")]
    DeploymentTimeout(Duration),

    #[error("invalid timeout '{0}': expected a positive integer of milliseconds")]
    InvalidTimeout(String),

    #[error(transparent)]
    InvalidInput(#[from] crate::types::InvalidInput),

    #[error("missing required input: {0}")]
    MissingInput(&'static str),

    #[error("private key is required: set STELO_PRIVATE_KEY or pass --private-key-file")]
    MissingKey,

    #[error("home directory not found (HOME is unset)")]
    NoHome,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
