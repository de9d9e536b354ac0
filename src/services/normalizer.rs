//! Result normalization.
//!
//! Folds every [`RawReply`] variant into a canonical [`QueryResult`]. The
//! mapping is total: unexpected shapes degrade to a sentinel-marked or
//! single-cell result instead of failing.

use serde_json::{Map, Value};

use crate::domain::models::{KvValue, QueryResult, RawReply, ARITY_ERROR_CELL, NULL_CELL};

/// Column name used for key-value replies.
const VALUE_COLUMN: &str = "value";
const KEY_COLUMN: &str = "key";

/// Stateless converter from raw dispatcher replies to canonical form.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer;

impl Normalizer {
    /// Canonical relational view of any reply.
    pub fn normalize(reply: &RawReply) -> QueryResult {
        match reply {
            RawReply::Null => QueryResult::empty(),
            RawReply::Relational { rows, error } => {
                Self::normalize_rows(rows.as_deref(), error.as_deref())
            }
            RawReply::Kv(kv) => Self::normalize_kv(kv),
            RawReply::Canonical(result) => Self::canonicalize(result),
            RawReply::Opaque { value: Value::Null } => QueryResult::empty(),
            RawReply::Opaque { value } => QueryResult {
                column_names: vec!["c0".to_string()],
                column_types: vec![type_name(value).to_string()],
                rows: vec![vec![cell_text(value)]],
                error: None,
            },
        }
    }

    /// Normalize a relational row sequence.
    ///
    /// The first row fixes the column count; an empty first row defers to the
    /// first row that has cells. A first row that is not itself an array makes
    /// the whole result single-column.
    pub fn normalize_rows(rows: Option<&[Value]>, error: Option<&str>) -> QueryResult {
        let error = error.map(str::to_string);
        let Some(first) = rows.and_then(<[Value]>::first) else {
            return QueryResult {
                error,
                ..QueryResult::empty()
            };
        };
        let rows = rows.unwrap_or_default();

        if !first.is_array() {
            return QueryResult {
                column_names: vec!["c0".to_string()],
                column_types: vec![type_name(first).to_string()],
                rows: rows.iter().map(|cell| vec![cell_text(cell)]).collect(),
                error,
            };
        }

        let header: Vec<&Value> = rows
            .iter()
            .map(row_cells)
            .find(|cells| !cells.is_empty())
            .unwrap_or_default();

        let width = header.len();
        let canonical_rows = rows
            .iter()
            .enumerate()
            .map(|(index, row)| {
                let cells = row_cells(row).into_iter().map(cell_text).collect();
                fit_row(index, cells, width)
            })
            .collect();

        QueryResult {
            column_names: synthesized_names(width),
            column_types: header.iter().map(|cell| type_name(cell).to_string()).collect(),
            rows: canonical_rows,
            error,
        }
    }

    /// Normalize a tagged key-value reply.
    pub fn normalize_kv(kv: &KvValue) -> QueryResult {
        match &kv.value {
            Value::Null => QueryResult {
                column_names: vec![VALUE_COLUMN.to_string()],
                column_types: vec!["null".to_string()],
                rows: Vec::new(),
                error: None,
            },
            Value::Array(items) => QueryResult {
                column_names: vec![VALUE_COLUMN.to_string()],
                column_types: vec![items.first().map_or("null", type_name).to_string()],
                rows: items.iter().map(|item| vec![cell_text(item)]).collect(),
                error: None,
            },
            Value::Object(entries) => QueryResult {
                column_names: vec![KEY_COLUMN.to_string(), VALUE_COLUMN.to_string()],
                column_types: vec![
                    "string".to_string(),
                    entries.values().next().map_or("null", type_name).to_string(),
                ],
                rows: entries
                    .iter()
                    .map(|(key, value)| vec![key.clone(), cell_text(value)])
                    .collect(),
                error: None,
            },
            scalar => QueryResult {
                column_names: vec![VALUE_COLUMN.to_string()],
                column_types: vec![type_name(scalar).to_string()],
                rows: vec![vec![cell_text(scalar)]],
                error: None,
            },
        }
    }

    /// Canonical key-value view of any reply.
    pub fn to_kv(reply: &RawReply) -> KvValue {
        match reply {
            RawReply::Null | RawReply::Opaque { value: Value::Null } => KvValue::null(),
            RawReply::Kv(kv) => kv.clone(),
            RawReply::Relational { rows, error } => {
                let value = rows
                    .as_ref()
                    .map_or(Value::Null, |rows| Value::Array(rows.clone()));
                let kv = KvValue::new("rows", value);
                match error {
                    Some(error) => kv.with_meta(error_meta(error)),
                    None => kv,
                }
            }
            RawReply::Canonical(result) => {
                let rows = result
                    .rows
                    .iter()
                    .map(|row| Value::Array(row.iter().cloned().map(Value::String).collect()))
                    .collect();
                let mut meta = result
                    .error
                    .as_deref()
                    .map(error_meta)
                    .unwrap_or_default();
                meta.insert(
                    "columns".to_string(),
                    Value::Array(
                        result
                            .column_names
                            .iter()
                            .cloned()
                            .map(Value::String)
                            .collect(),
                    ),
                );
                KvValue::new("rows", Value::Array(rows)).with_meta(meta)
            }
            RawReply::Opaque { value } => KvValue::new(type_name(value), value.clone()),
        }
    }

    /// Repair a result that claims to be canonical.
    ///
    /// Valid results come back unchanged.
    pub fn canonicalize(result: &QueryResult) -> QueryResult {
        let width = result.column_names.len();
        let mut column_types = result.column_types.clone();
        column_types.resize(width, "unknown".to_string());

        QueryResult {
            column_names: result.column_names.clone(),
            column_types,
            rows: result
                .rows
                .iter()
                .enumerate()
                .map(|(index, row)| fit_row(index, row.clone(), width))
                .collect(),
            error: result.error.clone(),
        }
    }
}

/// Deterministic text form of a cell.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => NULL_CELL.to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        // Object keys are sorted, so nested documents render deterministically.
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Runtime type name of a cell.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn synthesized_names(width: usize) -> Vec<String> {
    (0..width).map(|i| format!("c{i}")).collect()
}

/// Cells of one relational row; a scalar row is a single cell.
fn row_cells(row: &Value) -> Vec<&Value> {
    match row {
        Value::Array(cells) => cells.iter().collect(),
        scalar => vec![scalar],
    }
}

/// Pad short rows and fold the overflow of long rows into the last cell.
///
/// A long row keeps its displaced cells as a JSON array after
/// [`ARITY_ERROR_CELL`], so different long rows never normalize to the same
/// cells. Without columns there is nothing to fit against and the row is
/// kept as is.
fn fit_row(index: usize, mut cells: Vec<String>, width: usize) -> Vec<String> {
    if cells.len() == width || width == 0 {
        return cells;
    }

    tracing::debug!(
        row = index,
        expected = width,
        actual = cells.len(),
        "row arity mismatch, marking with sentinel"
    );

    if cells.len() < width {
        cells.resize(width, ARITY_ERROR_CELL.to_string());
    } else {
        let overflow = Value::from(cells.split_off(width - 1));
        cells.push(format!("{ARITY_ERROR_CELL}{overflow}"));
    }
    cells
}

fn error_meta(error: &str) -> Map<String, Value> {
    let mut meta = Map::new();
    meta.insert("error".to_string(), Value::String(error.to_string()));
    meta
}
