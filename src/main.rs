// ABOUTME: Entry point for the stelo CLI application.
// ABOUTME: Parses arguments, merges manifest defaults, and dispatches the run.

mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use stelo::config::{self, Manifest};
use stelo::error::{Error, Result};
use stelo::orchestrate::{self, DeployRequest, DeployStatus};
use stelo::output::{Output, OutputMode};
use std::env;
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;

const PRIVATE_KEY_ENV: &str = "STELO_PRIVATE_KEY";
const DEFAULT_DEPLOYER_BIN: &str = "vendor/bin/dep";
const DEFAULT_PORT: u16 = 22;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init { force } => {
            let cwd = env::current_dir()?;
            let path = config::init_manifest(&cwd, force)?;
            println!("Wrote {}", path.display());
            Ok(())
        }
        Commands::Run {
            environment,
            revision,
            private_key_file,
            known_hosts_file,
            deployer_bin,
            port,
            working_dir,
            verbosity,
            options,
            timeout,
            quiet,
            json,
        } => {
            let mode = if json {
                OutputMode::Json
            } else if quiet {
                OutputMode::Quiet
            } else {
                OutputMode::Normal
            };
            let mut output = Output::new(mode);

            let manifest = Manifest::discover(&working_dir)?.unwrap_or_default();

            let request = DeployRequest {
                private_key: read_private_key(private_key_file.as_deref())?,
                environment: environment
                    .or(manifest.environment)
                    .ok_or(Error::MissingInput("environment"))?,
                revision: revision
                    .or(manifest.revision)
                    .ok_or(Error::MissingInput("revision"))?,
                deployer_bin: deployer_bin
                    .or(manifest.deployer_bin)
                    .unwrap_or_else(|| DEFAULT_DEPLOYER_BIN.to_string()),
                known_hosts: known_hosts_file
                    .as_deref()
                    .map(read_known_hosts)
                    .transpose()?,
                port: port.or(manifest.port).unwrap_or(DEFAULT_PORT),
                working_dir,
                verbosity: verbosity.or(manifest.verbosity),
                options: options.or(manifest.options).unwrap_or_default(),
                timeout_ms: timeout.or(manifest.timeout_ms.map(|ms| ms.to_string())),
            };

            output.start_timer();
            let report = orchestrate::deploy(&request, &output).await;
            output.report(&report);

            if report.status == DeployStatus::Failed {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

/// The key comes from STELO_PRIVATE_KEY or a file, never from argv.
fn read_private_key(key_file: Option<&Path>) -> Result<String> {
    if let Ok(key) = env::var(PRIVATE_KEY_ENV)
        && !key.trim().is_empty()
    {
        return Ok(key);
    }
    match key_file {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => Err(Error::MissingKey),
    }
}

fn read_known_hosts(path: &Path) -> Result<String> {
    Ok(fs::read_to_string(path)?)
}
