//! Command-line triage interface.
//!
//! Replays persisted replies through the verification services:
//! `compare` for oracle checks, `tlp` for partition checks and `probe` for
//! stability sequences against configured targets.

pub mod commands;
pub mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;

#[derive(Parser, Debug)]
#[command(name = "arbiter", version, about = "Oracle verification for database testing")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .arbiter/config.yaml)
    #[arg(short, long, global = true, env = "ARBITER_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compare an original and a candidate reply under an oracle
    Compare(commands::compare::CompareArgs),

    /// Check the ternary logic partition invariant over four branch replies
    Tlp(commands::tlp::TlpArgs),

    /// Run command sequences against targets and classify crashes and hangs
    Probe(commands::probe::ProbeArgs),
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        match &self.config {
            Some(path) => ConfigLoader::load_from_file(path),
            None => ConfigLoader::load(),
        }
    }
}

/// Report a command error and exit with status 2.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let body = serde_json::json!({
            "error": err.to_string(),
            "causes": err.chain().skip(1).map(ToString::to_string).collect::<Vec<_>>(),
        });
        eprintln!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(2);
}
