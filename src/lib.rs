//! Arbiter - Oracle verification engine for database testing
//!
//! Arbiter decides whether a database misbehaved. It normalizes heterogeneous
//! backend replies into one canonical tabular form, compares them as
//! multisets, applies oracle policies, checks ternary logic partition counts
//! and classifies command sequences for crashes and hangs.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Canonical models, verdicts and the dispatcher port
//! - **Service Layer** (`services`): Normalization, comparison, oracles and probing
//! - **Infrastructure Layer** (`infrastructure`): Config, logging, subprocess dispatch, JSONL records
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```
//! use arbiter::{Normalizer, OracleChecker, OracleMode, RawReply};
//! use serde_json::json;
//!
//! let original = Normalizer::normalize(&RawReply::relational(vec![json!([1]), json!([2])]));
//! let candidate = Normalizer::normalize(&RawReply::relational(vec![json!([2]), json!([1])]));
//!
//! let verdict = OracleChecker::new().check(OracleMode::Equivalence, &original, &candidate);
//! assert!(verdict.passed);
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    BranchPayload, CommandSequence, ComparisonOutcome, Config, EventClassification, FailureKind,
    KvValue, OracleMode, OracleVerdict, PartitionCounts, QueryResult, RawReply, SequenceReport,
    SequenceStatus, TlpOutcome,
};
pub use domain::ports::Dispatcher;
pub use domain::DispatchError;
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{
    MultisetComparator, Normalizer, OracleChecker, SequencePool, StabilityProber, TlpInput,
    TlpVerifier,
};
