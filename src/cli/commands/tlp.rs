//! `arbiter tlp`

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::cli::output::{output, verdict_label, CommandOutput};
use crate::domain::models::{BranchPayload, Config, TlpOutcome};
use crate::infrastructure::reporting::JsonlRecordWriter;
use crate::services::{TlpInput, TlpVerifier};

#[derive(Args, Debug)]
pub struct TlpArgs {
    /// Reply of the unpartitioned query
    #[arg(long)]
    pub original: Option<PathBuf>,

    /// Reply of the `WHERE p` branch
    #[arg(long = "true")]
    pub true_branch: Option<PathBuf>,

    /// Reply of the `WHERE NOT p` branch
    #[arg(long = "false")]
    pub false_branch: Option<PathBuf>,

    /// Reply of the `WHERE p IS NULL` branch
    #[arg(long = "null")]
    pub null_branch: Option<PathBuf>,
}

/// Persisted TLP check.
#[derive(Debug, Serialize)]
pub struct TlpRecord {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub outcome: TlpOutcome,
}

impl CommandOutput for TlpRecord {
    fn to_human(&self) -> String {
        let mut lines = vec![format!("Verdict: {}", verdict_label(self.outcome.passed()))];
        match &self.outcome {
            TlpOutcome::Pass { detail } | TlpOutcome::Violation { detail, .. } => {
                lines.push(format!(
                    "Counts: original={} true={} false={} null={}",
                    detail.original_count, detail.true_count, detail.false_count, detail.null_count
                ));
                lines.push(format!("Sum: {} Difference: {}", detail.sum, detail.difference));
            }
            TlpOutcome::ParseError {
                branch,
                raw_payload,
                reason,
            } => {
                lines.push(format!("Unreadable {branch} branch: {reason}"));
                lines.push(format!("Payload: {raw_payload}"));
            }
        }
        lines.join("\n")
    }
}

async fn read_branch(path: Option<&Path>) -> Result<BranchPayload> {
    let Some(path) = path else {
        return Ok(BranchPayload::Absent);
    };
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(BranchPayload::Text(text))
}

pub async fn execute(args: TlpArgs, config: &Config, json_mode: bool) -> Result<bool> {
    let input = TlpInput::new(
        read_branch(args.original.as_deref()).await?,
        read_branch(args.true_branch.as_deref()).await?,
        read_branch(args.false_branch.as_deref()).await?,
        read_branch(args.null_branch.as_deref()).await?,
    );

    let record = TlpRecord {
        id: Uuid::new_v4(),
        recorded_at: Utc::now(),
        outcome: TlpVerifier::verify(&input),
    };

    if let Some(path) = &config.reporting.records_path {
        JsonlRecordWriter::new(path).append(&record).await?;
    }

    output(&record, json_mode);
    Ok(record.outcome.passed())
}
