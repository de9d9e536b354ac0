//! CLI command implementations.

pub mod compare;
pub mod probe;
pub mod tlp;

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

use crate::domain::models::RawReply;

/// Read a reply file.
///
/// Accepts a `RawReply` document (with a `family` tag), a bare array of rows,
/// or any other JSON value.
pub async fn read_reply(path: &Path) -> Result<RawReply> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;

    let is_document = value
        .as_object()
        .is_some_and(|map| map.contains_key("family"));
    if is_document {
        return serde_json::from_value(value)
            .with_context(|| format!("{} is not a valid reply document", path.display()));
    }

    let reply = match value {
        Value::Array(rows) => RawReply::relational(rows),
        Value::Null => RawReply::Null,
        other => RawReply::opaque(other),
    };
    Ok(reply)
}
