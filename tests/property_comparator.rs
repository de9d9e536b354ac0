use arbiter::{ComparisonOutcome, MultisetComparator, Normalizer, QueryResult, RawReply};
use proptest::prelude::*;
use serde_json::Value;

/// Rows of one shared width, zero included, whose cells include the
/// characters a joined key would use as separators.
fn rows_strategy(min: usize) -> impl Strategy<Value = Vec<Vec<String>>> {
    (0usize..4).prop_flat_map(move |width| {
        prop::collection::vec(prop::collection::vec("[ab,|]{0,3}", width), min..16)
    })
}

/// Loosely shaped relational rows: ragged arity, nulls, numbers and text.
fn raw_rows_strategy() -> impl Strategy<Value = Vec<Value>> {
    let cell = prop_oneof![
        Just(Value::Null),
        any::<i32>().prop_map(Value::from),
        "[a-z]{0,4}".prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
    ];
    prop::collection::vec(
        prop_oneof![
            prop::collection::vec(cell.clone(), 0..4).prop_map(Value::Array),
            cell,
        ],
        0..12,
    )
}

proptest! {
    /// Property: every result equals itself
    #[test]
    fn prop_result_equals_itself(rows in rows_strategy(0)) {
        let result = QueryResult::from_rows(rows);
        prop_assert_eq!(
            MultisetComparator::compare(&result, &result),
            ComparisonOutcome::Equal
        );
    }

    /// Property: row order never matters
    #[test]
    fn prop_order_is_irrelevant(rows in rows_strategy(1)) {
        let left = QueryResult::from_rows(rows.clone());
        let mut reversed = rows;
        reversed.reverse();
        let right = QueryResult::from_rows(reversed);

        prop_assert_eq!(
            MultisetComparator::compare(&left, &right),
            ComparisonOutcome::Equal
        );
    }

    /// Property: adding one row yields a strict superset in both directions
    #[test]
    fn prop_extra_row_is_strict_superset(
        rows in rows_strategy(1),
        extra in prop::collection::vec("[ab,|]{0,3}", 4),
    ) {
        let smaller = QueryResult::from_rows(rows.clone());
        let width = smaller.column_count();
        let mut more = rows;
        more.push(extra[..width].to_vec());
        let larger = QueryResult::from_rows(more);

        prop_assert_eq!(
            MultisetComparator::compare(&larger, &smaller),
            ComparisonOutcome::RightSubsetOfLeft
        );
        prop_assert_eq!(
            MultisetComparator::compare(&smaller, &larger),
            ComparisonOutcome::LeftSubsetOfRight
        );
    }

    /// Property: normalizing an already canonical result changes nothing
    #[test]
    fn prop_normalization_is_idempotent(rows in raw_rows_strategy()) {
        let once = Normalizer::normalize(&RawReply::relational(rows));
        let twice = Normalizer::normalize(&RawReply::Canonical(once.clone()));
        prop_assert_eq!(&once, &twice);

        for row in &once.rows {
            prop_assert_eq!(row.len(), once.column_count());
        }
    }

    /// Property: any reply, however ragged, normalizes to a result equal to itself
    #[test]
    fn prop_normalized_reply_equals_itself(rows in raw_rows_strategy()) {
        let result = Normalizer::normalize(&RawReply::relational(rows));
        prop_assert_eq!(
            MultisetComparator::compare(&result, &result),
            ComparisonOutcome::Equal
        );
    }

    /// Property: long rows that differ only past the header width stay distinct
    #[test]
    fn prop_long_rows_keep_their_overflow(
        header in prop::collection::vec(any::<i32>(), 1..4),
        overflow in prop::collection::vec(any::<i32>(), 1..4),
        other in prop::collection::vec(any::<i32>(), 1..4),
    ) {
        prop_assume!(overflow != other);

        let long_row = |tail: &[i32]| {
            let mut row = header.clone();
            row.extend_from_slice(tail);
            Value::from(row)
        };
        let left = Normalizer::normalize(&RawReply::relational(vec![
            Value::from(header.clone()),
            long_row(&overflow),
        ]));
        let right = Normalizer::normalize(&RawReply::relational(vec![
            Value::from(header.clone()),
            long_row(&other),
        ]));

        prop_assert_eq!(
            MultisetComparator::compare(&left, &right),
            ComparisonOutcome::PartialMismatch
        );
    }
}
