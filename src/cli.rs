// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stelo")]
#[command(about = "Single-run remote deployment with ephemeral SSH credentials")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a stelo.yml manifest with deployment defaults
    Init {
        /// Overwrite an existing manifest
        #[arg(long)]
        force: bool,
    },

    /// Run a deployment
    Run {
        /// Target environment (e.g. production)
        #[arg(short, long)]
        environment: Option<String>,

        /// Revision to deploy (commit hash, tag, ...)
        #[arg(short, long)]
        revision: Option<String>,

        /// File containing the SSH private key.
        /// The STELO_PRIVATE_KEY environment variable takes precedence.
        #[arg(long)]
        private_key_file: Option<PathBuf>,

        /// File with known_hosts entries; omitting it disables strict
        /// host key checking for this run
        #[arg(long)]
        known_hosts_file: Option<PathBuf>,

        /// Deployer binary path, relative to the working directory
        #[arg(long)]
        deployer_bin: Option<String>,

        /// SSH port
        #[arg(long)]
        port: Option<u16>,

        /// Directory to deploy from
        #[arg(long, default_value = ".")]
        working_dir: PathBuf,

        /// Deployer verbosity: v, vv or vvv
        #[arg(long)]
        verbosity: Option<String>,

        /// Extra options passed through to the deployer, quote-aware
        #[arg(long)]
        options: Option<String>,

        /// Deployment timeout in milliseconds
        #[arg(long)]
        timeout: Option<String>,

        /// Only print the final deployment-status line
        #[arg(long, conflicts_with = "json")]
        quiet: bool,

        /// Emit the result as a JSON event
        #[arg(long)]
        json: bool,
    },
}
