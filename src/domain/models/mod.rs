pub mod config;
pub mod partition;
pub mod result;
pub mod stability;
pub mod verdict;

pub use config::{
    Config, LoggingConfig, PolicyConfig, PoolConfig, ProberConfig, ReportingConfig, TargetConfig,
};
pub use partition::{BranchPayload, PartitionCounts, PartitionDetail, TlpBranch, TlpOutcome};
pub use result::{KvValue, QueryResult, RawReply, ARITY_ERROR_CELL, NULL_CELL};
pub use stability::{
    CommandSequence, EventClassification, SequenceReport, SequenceStatus, SequenceSummary,
    StabilityEvent,
};
pub use verdict::{ComparisonOutcome, ComparisonRecord, FailureKind, OracleMode, OracleVerdict};
