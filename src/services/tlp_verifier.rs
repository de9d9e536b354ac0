//! Ternary logic partitioning verification.
//!
//! Checks `count(original) == count(true) + count(false) + count(null)`.
//! Only row counts are involved; the multiset comparator is never used.

use serde_json::Value;

use crate::domain::models::{BranchPayload, PartitionCounts, TlpBranch, TlpOutcome};

/// The four branch payloads of one TLP check.
#[derive(Debug, Clone, PartialEq)]
pub struct TlpInput {
    pub original: BranchPayload,
    pub true_branch: BranchPayload,
    pub false_branch: BranchPayload,
    pub null_branch: BranchPayload,
}

impl TlpInput {
    pub fn new(
        original: impl Into<BranchPayload>,
        true_branch: impl Into<BranchPayload>,
        false_branch: impl Into<BranchPayload>,
        null_branch: impl Into<BranchPayload>,
    ) -> Self {
        Self {
            original: original.into(),
            true_branch: true_branch.into(),
            false_branch: false_branch.into(),
            null_branch: null_branch.into(),
        }
    }

    fn branches(&self) -> [(TlpBranch, &BranchPayload); 4] {
        [
            (TlpBranch::Original, &self.original),
            (TlpBranch::True, &self.true_branch),
            (TlpBranch::False, &self.false_branch),
            (TlpBranch::Null, &self.null_branch),
        ]
    }
}

/// A branch payload that could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchParseError {
    pub raw_payload: String,
    pub reason: String,
}

/// Verifies the TLP partition invariant.
#[derive(Debug, Clone, Copy, Default)]
pub struct TlpVerifier;

impl TlpVerifier {
    /// Count every branch and check the partition sum.
    pub fn verify(input: &TlpInput) -> TlpOutcome {
        let mut counts = [0usize; 4];
        for (slot, (branch, payload)) in counts.iter_mut().zip(input.branches()) {
            match Self::count(payload) {
                Ok(count) => *slot = count,
                Err(err) => {
                    tracing::warn!(branch = %branch, reason = %err.reason, "unreadable TLP branch");
                    return TlpOutcome::ParseError {
                        branch,
                        raw_payload: err.raw_payload,
                        reason: err.reason,
                    };
                }
            }
        }

        let [original, true_count, false_count, null_count] = counts;
        Self::verify_counts(PartitionCounts::new(original, true_count, false_count, null_count))
    }

    /// Check already-extracted counts.
    pub fn verify_counts(counts: PartitionCounts) -> TlpOutcome {
        let detail = counts.detail();
        if counts.is_consistent() {
            tracing::debug!(original = counts.original, sum = counts.sum(), "TLP partition holds");
            TlpOutcome::Pass { detail }
        } else {
            tracing::info!(
                original = counts.original,
                true_count = counts.true_count,
                false_count = counts.false_count,
                null_count = counts.null_count,
                difference = detail.difference,
                "TLP partition violated"
            );
            TlpOutcome::Violation {
                detail,
                bug_candidate: true,
            }
        }
    }

    /// Row count of one branch in any representation.
    pub fn count(payload: &BranchPayload) -> Result<usize, BranchParseError> {
        match payload {
            BranchPayload::Absent => Ok(0),
            BranchPayload::Result(result) => Ok(result.row_count()),
            BranchPayload::Kv(kv) => Ok(count_value(&kv.value)),
            BranchPayload::Json(value) => Ok(count_value(value)),
            BranchPayload::Text(text) => {
                if text.trim().is_empty() {
                    return Ok(0);
                }
                serde_json::from_str::<Value>(text)
                    .map(|value| count_value(&value))
                    .map_err(|err| BranchParseError {
                        raw_payload: text.clone(),
                        reason: err.to_string(),
                    })
            }
        }
    }
}

/// Null counts as zero rows, a sequence as its length, anything else as one.
///
/// A `{"type": ..., "value": ...}` document is counted by its inner value.
fn count_value(value: &Value) -> usize {
    match value {
        Value::Null => 0,
        Value::Array(items) => items.len(),
        Value::Object(map) if is_tagged_reply(map) => count_value(&map["value"]),
        _ => 1,
    }
}

fn is_tagged_reply(map: &serde_json::Map<String, Value>) -> bool {
    map.contains_key("type")
        && map.contains_key("value")
        && map.keys().all(|key| matches!(key.as_str(), "type" | "value" | "meta"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{KvValue, QueryResult};
    use serde_json::json;

    #[test]
    fn test_counts_by_representation() {
        assert_eq!(TlpVerifier::count(&BranchPayload::Absent), Ok(0));
        assert_eq!(TlpVerifier::count(&BranchPayload::Json(Value::Null)), Ok(0));
        assert_eq!(TlpVerifier::count(&BranchPayload::Json(json!([1, 2, 3]))), Ok(3));
        assert_eq!(TlpVerifier::count(&BranchPayload::Json(json!({"_id": 1}))), Ok(1));
        assert_eq!(TlpVerifier::count(&BranchPayload::Json(json!("x"))), Ok(1));
        assert_eq!(
            TlpVerifier::count(&BranchPayload::Kv(KvValue::new("list", json!(["a", "b"])))),
            Ok(2)
        );
        let result = QueryResult::from_rows(vec![vec!["1".into()], vec!["2".into()]]);
        assert_eq!(TlpVerifier::count(&BranchPayload::Result(result)), Ok(2));
    }

    #[test]
    fn test_tagged_document_counts_inner_value() {
        let payload = BranchPayload::Text(r#"{"type": "zset", "value": ["a", "b"]}"#.to_string());
        assert_eq!(TlpVerifier::count(&payload), Ok(2));

        let document = BranchPayload::Json(json!({"type": "user", "value": 3, "name": "x"}));
        assert_eq!(TlpVerifier::count(&document), Ok(1));
    }

    #[test]
    fn test_consistent_partition_passes() {
        let outcome = TlpVerifier::verify_counts(PartitionCounts::new(5, 2, 2, 1));
        assert!(outcome.passed());
        assert_eq!(outcome.detail().unwrap().sum, 5);
    }

    #[test]
    fn test_violation_keeps_counts() {
        let outcome = TlpVerifier::verify_counts(PartitionCounts::new(5, 2, 2, 2));
        match outcome {
            TlpOutcome::Violation {
                detail,
                bug_candidate,
            } => {
                assert!(bug_candidate);
                assert_eq!(detail.difference, -1);
                assert_eq!(detail.sum, 6);
                assert_eq!(detail.null_count, 2);
            }
            other => panic!("Expected violation, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_error_carries_raw_payload() {
        let input = TlpInput::new(
            json!([1, 2]),
            json!([1]),
            BranchPayload::Text("[1, 2".to_string()),
            BranchPayload::Absent,
        );
        match TlpVerifier::verify(&input) {
            TlpOutcome::ParseError {
                branch,
                raw_payload,
                ..
            } => {
                assert_eq!(branch, TlpBranch::False);
                assert_eq!(raw_payload, "[1, 2");
            }
            other => panic!("Expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_mixed_representations() {
        let input = TlpInput::new(
            BranchPayload::Text("[1, 2, 3]".to_string()),
            json!({"k": "v"}),
            KvValue::new("list", json!(["a"])).to_result(),
            json!("scalar"),
        );
        assert!(TlpVerifier::verify(&input).passed());
    }
}
