//! `arbiter probe`

use anyhow::{bail, Context, Result};
use clap::Args;
use comfy_table::Cell;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;

use crate::cli::output::{classification_cell, output, table, truncate, CommandOutput};
use crate::domain::models::{CommandSequence, Config};
use crate::infrastructure::dispatch::ProcessDispatcher;
use crate::infrastructure::reporting::JsonlRecordWriter;
use crate::services::{PoolReport, SequencePool, StabilityProber};

#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// JSON file holding an array of `{"target": ..., "commands": [...]}` sequences
    pub sequences: PathBuf,

    /// Override the configured number of concurrent sequences
    #[arg(short = 'n', long)]
    pub concurrency: Option<usize>,

    /// Override the configured failure budget
    #[arg(long)]
    pub failure_budget: Option<usize>,
}

impl CommandOutput for PoolReport {
    fn to_human(&self) -> String {
        let mut sections = Vec::new();

        for report in &self.reports {
            let mut events = table(&["#", "Command", "Result", "ms", "Error"]);
            for event in &report.events {
                events.add_row(vec![
                    Cell::new(event.index),
                    Cell::new(truncate(&event.command, 40)),
                    classification_cell(event.classification),
                    Cell::new(event.duration_ms),
                    Cell::new(truncate(event.error_message.as_deref().unwrap_or("-"), 40)),
                ]);
            }

            sections.push(format!(
                "Target: {} ({})\nStatus: {} crashed={} hung={} ok={} errors={} timeouts={}\n{events}",
                report.target,
                report.id,
                report.status,
                report.crashed,
                report.hung,
                report.summary.ok,
                report.summary.errors,
                report.summary.timeouts,
            ));
        }

        if !self.skipped.is_empty() {
            let targets: Vec<&str> = self.skipped.iter().map(|s| s.target.as_str()).collect();
            sections.push(format!(
                "Skipped {} sequence(s){}: {}",
                self.skipped.len(),
                if self.budget_exhausted {
                    " after failure budget was spent"
                } else {
                    ""
                },
                targets.join(", ")
            ));
        }

        sections.join("\n\n")
    }
}

pub async fn execute(args: ProbeArgs, config: &Config, json_mode: bool) -> Result<bool> {
    let text = tokio::fs::read_to_string(&args.sequences)
        .await
        .with_context(|| format!("Failed to read {}", args.sequences.display()))?;
    let sequences: Vec<CommandSequence> = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a sequence list", args.sequences.display()))?;

    for sequence in &sequences {
        if !config.targets.contains_key(&sequence.target) {
            bail!("No target named '{}' in configuration", sequence.target);
        }
    }

    let mut pool_config = config.pool.clone();
    if let Some(concurrency) = args.concurrency {
        pool_config.max_concurrent_sequences = concurrency.max(1);
    }
    if args.failure_budget.is_some() {
        pool_config.failure_budget = args.failure_budget;
    }

    let dispatcher = Arc::new(ProcessDispatcher::new(config.targets.clone()));
    let prober = Arc::new(StabilityProber::new(dispatcher, config.prober.clone()));
    let pool = SequencePool::new(prober, pool_config);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, aborting running sequences");
            let _ = shutdown_tx.send(true);
        }
    });

    let result = pool.run(sequences, shutdown_rx).await;

    if let Some(path) = &config.reporting.records_path {
        let writer = JsonlRecordWriter::new(path);
        for report in &result.reports {
            writer.append(report).await?;
        }
    }

    output(&result, json_mode);
    Ok(result.crashed() == 0 && result.hung() == 0 && result.skipped.is_empty())
}
