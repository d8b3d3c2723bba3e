//! CLI for the ADM archive download manager.

mod api;
mod commands;

use adm_core::config::{self, AdmConfig};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{run_bundle, run_serve, run_show_config};

/// Top-level CLI for the ADM archive download manager.
#[derive(Debug, Parser)]
#[command(name = "adm")]
#[command(about = "ADM: bundle remote files into one zip per task", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/adm/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Serve the HTTP API (create tasks, submit URLs, download archives).
    Serve {
        /// Address to bind, e.g. 127.0.0.1:8080 (overrides config).
        #[arg(long, value_name = "ADDR")]
        listen: Option<String>,
        /// Directory for finished archives (overrides config).
        #[arg(long, value_name = "DIR")]
        archive_dir: Option<PathBuf>,
    },

    /// Build one archive from the given URLs and print the resulting task.
    Bundle {
        /// Direct HTTP/HTTPS URLs to bundle.
        #[arg(required = true)]
        urls: Vec<String>,
        /// Directory for the archive (overrides config).
        #[arg(long, value_name = "DIR")]
        archive_dir: Option<PathBuf>,
    },

    /// Print the effective configuration and where it was loaded from.
    Config,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let (cfg, source) = load_config(cli.config)?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Serve {
                listen,
                archive_dir,
            } => run_serve(with_overrides(cfg, listen, archive_dir)).await?,
            CliCommand::Bundle { urls, archive_dir } => {
                run_bundle(with_overrides(cfg, None, archive_dir), &urls).await?
            }
            CliCommand::Config => run_show_config(&cfg, &source)?,
        }

        Ok(())
    }
}

fn load_config(explicit: Option<PathBuf>) -> Result<(AdmConfig, PathBuf)> {
    match explicit {
        Some(path) => Ok((config::load_from_path(&path)?, path)),
        None => Ok((config::load_or_init()?, config::config_path()?)),
    }
}

fn with_overrides(
    mut cfg: AdmConfig,
    listen: Option<String>,
    archive_dir: Option<PathBuf>,
) -> AdmConfig {
    if let Some(addr) = listen {
        cfg.listen_addr = addr;
    }
    if let Some(dir) = archive_dir {
        cfg.archive_dir = dir;
    }
    cfg
}

#[cfg(test)]
mod tests;
