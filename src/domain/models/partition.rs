//! Ternary logic partitioning (TLP) data.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::result::{KvValue, QueryResult};

/// Row counts of the original query and its three partitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionCounts {
    pub original: usize,
    pub true_count: usize,
    pub false_count: usize,
    pub null_count: usize,
}

impl PartitionCounts {
    pub fn new(original: usize, true_count: usize, false_count: usize, null_count: usize) -> Self {
        Self {
            original,
            true_count,
            false_count,
            null_count,
        }
    }

    /// `true + false + null`
    pub fn sum(&self) -> usize {
        self.true_count + self.false_count + self.null_count
    }

    /// `original - sum`; negative when the partitions over-count.
    pub fn difference(&self) -> i64 {
        self.original as i64 - self.sum() as i64
    }

    pub fn is_consistent(&self) -> bool {
        self.difference() == 0
    }

    pub fn detail(&self) -> PartitionDetail {
        PartitionDetail {
            original_count: self.original,
            true_count: self.true_count,
            false_count: self.false_count,
            null_count: self.null_count,
            sum: self.sum(),
            difference: self.difference(),
        }
    }
}

/// Flattened counts kept verbatim for triage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionDetail {
    pub original_count: usize,
    pub true_count: usize,
    pub false_count: usize,
    pub null_count: usize,
    pub sum: usize,
    pub difference: i64,
}

/// Which input of a TLP check a payload belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TlpBranch {
    Original,
    True,
    False,
    Null,
}

impl fmt::Display for TlpBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Original => "original",
            Self::True => "true",
            Self::False => "false",
            Self::Null => "null",
        };
        f.write_str(name)
    }
}

/// One branch result in whatever representation the dispatcher produced.
#[derive(Debug, Clone, PartialEq)]
pub enum BranchPayload {
    Absent,
    /// Unparsed JSON text.
    Text(String),
    Json(Value),
    Kv(KvValue),
    Result(QueryResult),
}

impl From<QueryResult> for BranchPayload {
    fn from(result: QueryResult) -> Self {
        Self::Result(result)
    }
}

impl From<KvValue> for BranchPayload {
    fn from(kv: KvValue) -> Self {
        Self::Kv(kv)
    }
}

impl From<Value> for BranchPayload {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<Option<String>> for BranchPayload {
    fn from(text: Option<String>) -> Self {
        text.map_or(Self::Absent, Self::Text)
    }
}

/// Outcome of a TLP partition check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TlpOutcome {
    /// Partitions add up to the original count.
    Pass { detail: PartitionDetail },

    /// Partitions disagree with the original count.
    Violation {
        detail: PartitionDetail,
        bug_candidate: bool,
    },

    /// A branch payload could not be read; the raw text is kept.
    ParseError {
        branch: TlpBranch,
        raw_payload: String,
        reason: String,
    },
}

impl TlpOutcome {
    pub fn passed(&self) -> bool {
        matches!(self, Self::Pass { .. })
    }

    pub fn detail(&self) -> Option<&PartitionDetail> {
        match self {
            Self::Pass { detail } | Self::Violation { detail, .. } => Some(detail),
            Self::ParseError { .. } => None,
        }
    }
}
