//! Arbor Command Line Interface
//!
//! Loads definition documents and builds, checks or runs the node trees
//! they describe.

mod commands;

use anyhow::{Context, Result};
use arbor_runtime::config::RuntimeConfig;
use arbor_runtime::logging::init_logging;
use arbor_runtime::Runtime;
use clap::{Parser, Subcommand};

use commands::check::{execute_check, CheckArgs};
use commands::run::{execute_run, RunArgs};
use commands::tree::{execute_tree, TreeArgs};

/// Arbor Command Line Interface
#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    /// JSON runtime configuration file; repeat to layer several files,
    /// later ones overriding earlier ones
    #[clap(long, global = true)]
    config: Vec<String>,

    /// Log level, overriding the configuration
    #[clap(long, global = true)]
    log_level: Option<String>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build, initialize and start a node tree
    Run(RunArgs),

    /// Build a node tree and report what it contains
    Check(CheckArgs),

    /// Build a node tree and list its nodes
    Tree(TreeArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Configuration decides the worker count, so it is read before the
    // main runtime exists.
    let mut config = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(RuntimeConfig::load_layered(&cli.config))?;

    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    init_logging(config.level()?);

    let workers = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.worker_threads)
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;

    workers.block_on(async move {
        let runtime = Runtime::new(config)?;
        match &cli.command {
            Commands::Run(args) => execute_run(&runtime, args).await,
            Commands::Check(args) => execute_check(&runtime, args).await,
            Commands::Tree(args) => execute_tree(&runtime, args).await,
        }
    })
}
