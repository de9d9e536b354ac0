//! Oracle policy evaluation.
//!
//! Turns a comparator outcome and a declared [`OracleMode`] into an
//! [`OracleVerdict`]. Execution and transfer failures are terminal verdicts
//! produced before any comparison happens.

use crate::domain::models::{
    ComparisonOutcome, FailureKind, OracleMode, OracleVerdict, PolicyConfig, QueryResult,
    NULL_CELL,
};
use crate::services::comparator::MultisetComparator;

/// Cell text of a counting query that found nothing.
const ZERO_COUNT_CELL: &str = "0";

/// Applies oracle policy to pairs of canonical results.
#[derive(Debug, Clone, Copy, Default)]
pub struct OracleChecker {
    policy: PolicyConfig,
}

impl OracleChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: PolicyConfig) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> PolicyConfig {
        self.policy
    }

    /// Full check: intercept execution errors, then compare and evaluate.
    ///
    /// An error on either side yields a terminal `ExecutionError` verdict and
    /// the comparator is never consulted.
    pub fn check(
        &self,
        mode: OracleMode,
        original: &QueryResult,
        candidate: &QueryResult,
    ) -> OracleVerdict {
        if let Some(reason) = execution_error(original, candidate) {
            tracing::debug!(reason = %reason, "execution error, skipping comparison");
            return OracleVerdict::terminal(FailureKind::ExecutionError, reason);
        }

        self.evaluate(mode, original, candidate)
    }

    /// Terminal verdict for a statement that could not be translated.
    pub fn transfer_failed(reason: impl Into<String>) -> OracleVerdict {
        OracleVerdict::terminal(FailureKind::TransferError, reason)
    }

    /// Evaluate the oracle over two error-free results.
    pub fn evaluate(
        &self,
        mode: OracleMode,
        original: &QueryResult,
        candidate: &QueryResult,
    ) -> OracleVerdict {
        if self.policy.zero_count_equals_null_row
            && is_zero_count_vs_null_row(original, candidate)
        {
            tracing::debug!("zero count matched null row under policy flag");
            return OracleVerdict::pass(ComparisonOutcome::Equal);
        }

        let outcome = MultisetComparator::compare(original, candidate);
        let verdict = if Self::accepts(mode, outcome) {
            OracleVerdict::pass(outcome)
        } else {
            OracleVerdict::violation(outcome)
        };

        tracing::debug!(
            oracle = %mode,
            outcome = %outcome,
            passed = verdict.passed,
            "oracle evaluated"
        );

        verdict
    }

    /// Whether `outcome` satisfies `mode`.
    pub fn accepts(mode: OracleMode, outcome: ComparisonOutcome) -> bool {
        let OracleMode::BoundedInclusion { direction_upper } = mode else {
            return outcome == ComparisonOutcome::Equal;
        };
        match outcome {
            ComparisonOutcome::Equal => true,
            ComparisonOutcome::LeftSubsetOfRight => direction_upper,
            ComparisonOutcome::RightSubsetOfLeft => !direction_upper,
            _ => false,
        }
    }
}

fn execution_error(original: &QueryResult, candidate: &QueryResult) -> Option<String> {
    match (&original.error, &candidate.error) {
        (Some(left), Some(right)) => Some(format!("original: {left}; candidate: {right}")),
        (Some(left), None) => Some(format!("original: {left}")),
        (None, Some(right)) => Some(format!("candidate: {right}")),
        (None, None) => None,
    }
}

fn is_zero_count_vs_null_row(original: &QueryResult, candidate: &QueryResult) -> bool {
    matches!(
        (original.single_cell(), candidate.single_cell()),
        (Some(ZERO_COUNT_CELL), Some(NULL_CELL)) | (Some(NULL_CELL), Some(ZERO_COUNT_CELL))
    )
}
