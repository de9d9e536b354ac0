//! Multiset comparison of canonical results.
//!
//! Rows are compared by multiplicity, ignoring order. Each row is keyed by
//! its cell slice itself, so two rows only match when they have the same
//! number of cells and every cell is equal.

use std::collections::HashMap;

use crate::domain::models::{ComparisonOutcome, QueryResult};

/// Classifies the set relationship between two results.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultisetComparator;

impl MultisetComparator {
    /// Compare `left` (original) against `right` (candidate).
    ///
    /// Callers must handle execution errors before getting here; the error
    /// field of either side is ignored.
    pub fn compare(left: &QueryResult, right: &QueryResult) -> ComparisonOutcome {
        if left.column_count() != right.column_count() {
            // A side without columns only has a multiplicity to compare.
            let schemaless = left.column_count() == 0 || right.column_count() == 0;
            return match (left.is_empty(), right.is_empty()) {
                (true, true) if schemaless => ComparisonOutcome::Equal,
                (true, false) if schemaless => ComparisonOutcome::LeftSubsetOfRight,
                (false, true) if schemaless => ComparisonOutcome::RightSubsetOfLeft,
                _ => ComparisonOutcome::SchemaMismatch,
            };
        }

        let mut remaining: HashMap<&[String], usize> = HashMap::with_capacity(right.rows.len());
        for row in &right.rows {
            *remaining.entry(row.as_slice()).or_insert(0) += 1;
        }
        let mut right_left_over = right.rows.len();

        let mut left_unmatched = false;
        for row in &left.rows {
            match remaining.get_mut(row.as_slice()) {
                Some(count) if *count > 0 => {
                    *count -= 1;
                    right_left_over -= 1;
                }
                _ => left_unmatched = true,
            }
        }

        let outcome = match (left_unmatched, right_left_over == 0) {
            (false, true) => ComparisonOutcome::Equal,
            (false, false) => ComparisonOutcome::LeftSubsetOfRight,
            (true, true) => ComparisonOutcome::RightSubsetOfLeft,
            (true, false) => ComparisonOutcome::PartialMismatch,
        };

        tracing::trace!(
            left_rows = left.rows.len(),
            right_rows = right.rows.len(),
            outcome = %outcome,
            "compared results"
        );

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(rows: &[&[&str]]) -> QueryResult {
        QueryResult::from_rows(
            rows.iter()
                .map(|row| row.iter().map(|cell| (*cell).to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_equal_ignores_order() {
        let a = result(&[&["1", "a"], &["2", "b"]]);
        let b = result(&[&["2", "b"], &["1", "a"]]);
        assert_eq!(MultisetComparator::compare(&a, &b), ComparisonOutcome::Equal);
    }

    #[test]
    fn test_duplicates_count_by_multiplicity() {
        let original = result(&[&["1"], &["2"], &["2"]]);
        let candidate = result(&[&["1"], &["2"]]);
        assert_eq!(
            MultisetComparator::compare(&original, &candidate),
            ComparisonOutcome::RightSubsetOfLeft
        );
        assert_eq!(
            MultisetComparator::compare(&candidate, &original),
            ComparisonOutcome::LeftSubsetOfRight
        );
    }

    #[test]
    fn test_both_empty_is_equal() {
        assert_eq!(
            MultisetComparator::compare(&QueryResult::empty(), &QueryResult::empty()),
            ComparisonOutcome::Equal
        );
    }

    #[test]
    fn test_empty_against_rows_is_subset() {
        let rows = result(&[&["1"]]);
        assert_eq!(
            MultisetComparator::compare(&QueryResult::empty(), &rows),
            ComparisonOutcome::LeftSubsetOfRight
        );
        assert_eq!(
            MultisetComparator::compare(&rows, &QueryResult::empty()),
            ComparisonOutcome::RightSubsetOfLeft
        );
    }

    #[test]
    fn test_zero_width_rows_compare_by_multiplicity() {
        let two: &[&[&str]] = &[&[], &[]];
        let one: &[&[&str]] = &[&[]];
        let (two, one) = (result(two), result(one));
        assert_eq!(two.column_count(), 0);

        assert_eq!(MultisetComparator::compare(&two, &two), ComparisonOutcome::Equal);
        assert_eq!(
            MultisetComparator::compare(&two, &one),
            ComparisonOutcome::RightSubsetOfLeft
        );
        assert_eq!(
            MultisetComparator::compare(&two, &result(&[&["1"]])),
            ComparisonOutcome::SchemaMismatch
        );
    }

    #[test]
    fn test_column_count_mismatch() {
        let a = result(&[&["1", "2"]]);
        let b = result(&[&["1"]]);
        assert_eq!(MultisetComparator::compare(&a, &b), ComparisonOutcome::SchemaMismatch);
    }

    #[test]
    fn test_partial_mismatch() {
        let a = result(&[&["1"], &["2"]]);
        let b = result(&[&["2"], &["3"]]);
        assert_eq!(MultisetComparator::compare(&a, &b), ComparisonOutcome::PartialMismatch);
    }

    #[test]
    fn test_rows_joining_to_same_text_do_not_collide() {
        // "a|b" + "c" and "a" + "b|c" join to the same string with a `|` delimiter.
        let a = result(&[&["a|b", "c"]]);
        let b = result(&[&["a", "b|c"]]);
        assert_eq!(MultisetComparator::compare(&a, &b), ComparisonOutcome::PartialMismatch);
    }

    #[test]
    fn test_error_field_is_ignored() {
        let mut a = result(&[&["1"]]);
        a.error = Some("ignored".to_string());
        let b = result(&[&["1"]]);
        assert_eq!(MultisetComparator::compare(&a, &b), ComparisonOutcome::Equal);
    }
}
