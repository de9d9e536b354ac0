//! Verdict record output
//!
//! Verdicts and reports are plain serde data; this module appends them to a
//! JSON-lines file, one record per line.

pub mod jsonl;

pub use jsonl::JsonlRecordWriter;
