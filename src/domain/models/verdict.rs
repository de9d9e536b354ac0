//! Comparator outcomes, oracle modes and verdicts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Set relationship between two canonical results (left = original, right = candidate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOutcome {
    Equal,
    LeftSubsetOfRight,
    RightSubsetOfLeft,
    SchemaMismatch,
    PartialMismatch,
}

impl ComparisonOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::LeftSubsetOfRight => "left_subset_of_right",
            Self::RightSubsetOfLeft => "right_subset_of_left",
            Self::SchemaMismatch => "schema_mismatch",
            Self::PartialMismatch => "partial_mismatch",
        }
    }
}

impl fmt::Display for ComparisonOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared relationship the candidate result must keep with the original.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum OracleMode {
    /// Candidate must equal the original as a multiset.
    Equivalence,

    /// Candidate may equal the original; otherwise it must be a strict
    /// superset (`direction_upper`) or a strict subset (`!direction_upper`).
    BoundedInclusion { direction_upper: bool },
}

impl OracleMode {
    pub fn upper() -> Self {
        Self::BoundedInclusion {
            direction_upper: true,
        }
    }

    pub fn lower() -> Self {
        Self::BoundedInclusion {
            direction_upper: false,
        }
    }

    /// Parse the CLI spelling: `equivalence`, `upper`, `lower`.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "equivalence" | "equal" => Some(Self::Equivalence),
            "upper" | "superset" => Some(Self::upper()),
            "lower" | "subset" => Some(Self::lower()),
            _ => None,
        }
    }
}

impl fmt::Display for OracleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equivalence => f.write_str("equivalence"),
            Self::BoundedInclusion {
                direction_upper: true,
            } => f.write_str("bounded_inclusion(upper)"),
            Self::BoundedInclusion {
                direction_upper: false,
            } => f.write_str("bounded_inclusion(lower)"),
        }
    }
}

/// Why a check did not pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The backend failed to run a statement.
    ExecutionError,
    /// Translation failed before anything was executed.
    TransferError,
    /// Column counts differ between the two sides.
    SchemaMismatch,
    /// A TLP branch payload could not be parsed.
    ParseError,
    /// Results disagree with the declared oracle.
    LogicViolation,
}

impl FailureKind {
    /// Infrastructure failures are never bug candidates.
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, Self::ExecutionError | Self::TransferError)
    }
}

/// Pass/fail decision for one oracle check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleVerdict {
    pub passed: bool,

    /// Set only for execution/transfer failures; logic violations leave it empty.
    pub error_reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<ComparisonOutcome>,
}

impl OracleVerdict {
    pub fn pass(outcome: ComparisonOutcome) -> Self {
        Self {
            passed: true,
            error_reason: None,
            failure: None,
            outcome: Some(outcome),
        }
    }

    /// Failed comparison: schema mismatch or logic violation.
    pub fn violation(outcome: ComparisonOutcome) -> Self {
        let failure = if outcome == ComparisonOutcome::SchemaMismatch {
            FailureKind::SchemaMismatch
        } else {
            FailureKind::LogicViolation
        };
        Self {
            passed: false,
            error_reason: None,
            failure: Some(failure),
            outcome: Some(outcome),
        }
    }

    /// Terminal verdict for a failure that happened before any comparison.
    pub fn terminal(kind: FailureKind, reason: impl Into<String>) -> Self {
        Self {
            passed: false,
            error_reason: Some(reason.into()),
            failure: Some(kind),
            outcome: None,
        }
    }

    /// A failed verdict that points at a database bug rather than infrastructure.
    pub fn is_bug_candidate(&self) -> bool {
        !self.passed && self.failure.is_some_and(|kind| !kind.is_infrastructure())
    }
}

/// Persistable record of one comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonRecord {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub oracle: OracleMode,
    pub verdict: OracleVerdict,
    pub original_rows: usize,
    pub candidate_rows: usize,
}

impl ComparisonRecord {
    pub fn new(
        oracle: OracleMode,
        verdict: OracleVerdict,
        original_rows: usize,
        candidate_rows: usize,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            oracle,
            verdict,
            original_rows,
            candidate_rows,
        }
    }
}
