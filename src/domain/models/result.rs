//! Canonical execution outcomes.
//!
//! Every backend reply, relational or key-value, is folded into a
//! [`QueryResult`] before it reaches the comparator. [`RawReply`] is the
//! tagged union accepted at the normalization boundary; [`KvValue`] is the
//! canonical shape for key-value, range and document replies.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Cell text used for SQL `NULL` / absent values.
pub const NULL_CELL: &str = "None";

/// Cell text used to pad or mark rows whose arity disagrees with the header.
pub const ARITY_ERROR_CELL: &str = "<arity-error>";

/// Backend-independent representation of one execution outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct QueryResult {
    /// Ordered column names; uniqueness is not required.
    #[serde(default)]
    pub column_names: Vec<String>,

    /// Column type names, parallel to `column_names`.
    #[serde(default)]
    pub column_types: Vec<String>,

    /// Rows as ordered cell text.
    #[serde(default)]
    pub rows: Vec<Vec<String>>,

    /// Execution error reported by the backend, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryResult {
    /// Result with no columns and no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Result carrying only an execution error.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Build a result whose columns are named `c0..cN` and typed `string`.
    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        let width = rows.first().map_or(0, Vec::len);
        Self {
            column_names: (0..width).map(|i| format!("c{i}")).collect(),
            column_types: vec!["string".to_string(); width],
            rows,
            error: None,
        }
    }

    pub fn column_count(&self) -> usize {
        self.column_names.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// True when the result holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// The single cell of a one-row, one-column result.
    pub fn single_cell(&self) -> Option<&str> {
        match self.rows.as_slice() {
            [row] if row.len() == 1 => Some(row[0].as_str()),
            _ => None,
        }
    }
}

/// Canonical shape of a key-value, range or document reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KvValue {
    /// Reply tag reported by the backend (`string`, `list`, `hash`, ...).
    #[serde(rename = "type")]
    pub kind: String,

    /// Scalar, sequence, mapping or null.
    #[serde(default)]
    pub value: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,
}

impl KvValue {
    pub fn new(kind: impl Into<String>, value: Value) -> Self {
        Self {
            kind: kind.into(),
            value,
            meta: None,
        }
    }

    pub fn null() -> Self {
        Self::new("null", Value::Null)
    }

    pub fn with_meta(mut self, meta: Map<String, Value>) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    /// Relational view of this value.
    pub fn to_result(&self) -> QueryResult {
        crate::services::normalizer::Normalizer::normalize_kv(self)
    }
}

/// Raw reply handed over by the execution dispatcher.
///
/// Serialized form is internally tagged by `family`:
///
/// ```json
/// {"family": "relational", "rows": [[1, "a"]], "error": null}
/// {"family": "kv", "type": "list", "value": ["a", "b"]}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum RawReply {
    /// No reply at all.
    Null,

    /// Row sequence from a relational backend.
    Relational {
        #[serde(default)]
        rows: Option<Vec<Value>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    /// Tagged scalar, sequence or mapping reply.
    Kv(KvValue),

    /// A result that is already canonical.
    Canonical(QueryResult),

    /// Anything else; normalized through its string form.
    Opaque { value: Value },
}

impl RawReply {
    pub fn relational(rows: Vec<Value>) -> Self {
        Self::Relational {
            rows: Some(rows),
            error: None,
        }
    }

    pub fn relational_error(error: impl Into<String>) -> Self {
        Self::Relational {
            rows: None,
            error: Some(error.into()),
        }
    }

    pub fn kv(kind: impl Into<String>, value: Value) -> Self {
        Self::Kv(KvValue::new(kind, value))
    }

    pub fn opaque(value: Value) -> Self {
        Self::Opaque { value }
    }

    /// Compact text form used in stability event logs.
    pub fn preview(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Kv(kv) => match &kv.value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
            Self::Opaque { value } => value.to_string(),
            other => serde_json::to_string(other).unwrap_or_default(),
        }
    }
}

impl From<QueryResult> for RawReply {
    fn from(result: QueryResult) -> Self {
        Self::Canonical(result)
    }
}
