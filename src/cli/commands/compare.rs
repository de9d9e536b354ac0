//! `arbiter compare`

use anyhow::{anyhow, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::commands::read_reply;
use crate::cli::output::{output, verdict_label, CommandOutput};
use crate::domain::models::{ComparisonRecord, Config, OracleMode, OracleVerdict, PolicyConfig};
use crate::infrastructure::reporting::JsonlRecordWriter;
use crate::services::{Normalizer, OracleChecker};

#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Reply of the original statement
    pub original: PathBuf,

    /// Reply of the mutated or translated statement
    pub candidate: PathBuf,

    /// Oracle: equivalence, upper (candidate may add rows), lower (candidate may drop rows)
    #[arg(short, long, default_value = "equivalence")]
    pub oracle: String,

    /// Treat a single `0` row and a single `None` row as equal
    #[arg(long)]
    pub zero_count_equals_null_row: bool,
}

#[derive(Debug, Serialize)]
pub struct CompareOutput {
    pub oracle: OracleMode,
    pub verdict: OracleVerdict,
    pub original_rows: usize,
    pub candidate_rows: usize,
}

impl CommandOutput for CompareOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("Verdict: {}", verdict_label(self.verdict.passed)),
            format!("Oracle: {}", self.oracle),
            format!(
                "Rows: original={} candidate={}",
                self.original_rows, self.candidate_rows
            ),
        ];
        if let Some(outcome) = self.verdict.outcome {
            lines.push(format!("Outcome: {outcome}"));
        }
        if let Some(failure) = self.verdict.failure {
            lines.push(format!("Failure: {failure:?}"));
        }
        if let Some(reason) = &self.verdict.error_reason {
            lines.push(format!("Reason: {reason}"));
        }
        lines.join("\n")
    }
}

pub async fn execute(args: CompareArgs, config: &Config, json_mode: bool) -> Result<bool> {
    let oracle = OracleMode::from_str(&args.oracle)
        .ok_or_else(|| anyhow!("Invalid oracle: {}", args.oracle))?;

    let original = Normalizer::normalize(&read_reply(&args.original).await?);
    let candidate = Normalizer::normalize(&read_reply(&args.candidate).await?);

    let policy = PolicyConfig {
        zero_count_equals_null_row: args.zero_count_equals_null_row
            || config.policy.zero_count_equals_null_row,
    };
    let verdict = OracleChecker::with_policy(policy).check(oracle, &original, &candidate);

    if let Some(path) = &config.reporting.records_path {
        let record = ComparisonRecord::new(
            oracle,
            verdict.clone(),
            original.row_count(),
            candidate.row_count(),
        );
        JsonlRecordWriter::new(path).append(&record).await?;
    }

    let result = CompareOutput {
        oracle,
        verdict,
        original_rows: original.row_count(),
        candidate_rows: candidate.row_count(),
    };
    output(&result, json_mode);

    Ok(result.verdict.passed)
}
