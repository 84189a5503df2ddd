// ABOUTME: Validated domain types for a deployment run.
// ABOUTME: Environment and revision newtypes, verbosity levels, and the deploy argv.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InvalidInput {
    #[error("environment cannot be empty")]
    EmptyEnvironment,

    #[error("revision cannot be empty")]
    EmptyRevision,

    #[error("invalid verbosity '{0}', expected v, vv or vvv")]
    BadVerbosity(String),
}

/// Target environment name, e.g. `production`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment(String);

impl Environment {
    pub fn new(value: &str) -> Result<Self, InvalidInput> {
        if value.trim().is_empty() {
            return Err(InvalidInput::EmptyEnvironment);
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Revision identifier to deploy, e.g. a commit hash or tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision(String);

impl Revision {
    pub fn new(value: &str) -> Result<Self, InvalidInput> {
        if value.trim().is_empty() {
            return Err(InvalidInput::EmptyRevision);
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Deployer output verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    V,
    Vv,
    Vvv,
}

impl Verbosity {
    /// The flag form passed to the deployer.
    pub fn flag(self) -> &'static str {
        match self {
            Verbosity::V => "-v",
            Verbosity::Vv => "-vv",
            Verbosity::Vvv => "-vvv",
        }
    }
}

impl FromStr for Verbosity {
    type Err = InvalidInput;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "v" => Ok(Verbosity::V),
            "vv" => Ok(Verbosity::Vv),
            "vvv" => Ok(Verbosity::Vvv),
            other => Err(InvalidInput::BadVerbosity(other.to_string())),
        }
    }
}

/// The argument vector handed to the deployer binary.
///
/// Fixed order: `deploy <env> --revision=<rev>` then the optional verbosity
/// flag, then the extra-option tokens. Built once; the executor passes the
/// elements as discrete argv entries, never re-joined into a shell string.
#[derive(Debug, Clone)]
pub struct DeployCommand {
    args: Vec<String>,
}

impl DeployCommand {
    pub fn new(
        environment: &Environment,
        revision: &Revision,
        verbosity: Option<Verbosity>,
        options: Vec<String>,
    ) -> Self {
        let mut args = vec![
            "deploy".to_string(),
            environment.to_string(),
            format!("--revision={revision}"),
        ];
        if let Some(v) = verbosity {
            args.push(v.flag().to_string());
        }
        args.extend(options);
        Self { args }
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}
