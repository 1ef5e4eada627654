//! CLI for the passmon supervised job runner.

mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::{Parser, Subcommand};
use passmon_core::config;
use std::path::PathBuf;

use commands::run_workload;

/// Top-level CLI for the passmon supervised job runner.
#[derive(Debug, Parser)]
#[command(name = "passmon")]
#[command(about = "passmon: run multi-pass jobs under supervision with a live status line", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run the built-in digest workload under supervision.
    Run {
        /// Number of digest passes (default from config).
        #[arg(long, value_name = "N")]
        passes: Option<u64>,

        /// Buffer size in MiB hashed by each pass (default from config).
        #[arg(long, value_name = "MIB")]
        buf_mib: Option<u64>,

        /// Append the artifact record to this file instead of stdout.
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Override the poll/render interval in milliseconds.
        #[arg(long, value_name = "MS")]
        poll_ms: Option<u64>,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run {
                passes,
                buf_mib,
                output,
                poll_ms,
            } => run_workload(&cfg, passes, buf_mib, output, poll_ms).await?,
        }
        Ok(())
    }
}
