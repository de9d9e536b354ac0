//! Stability probing records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Health classification of a single command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventClassification {
    Ok,
    Error,
    Timeout,
    Crash,
}

impl EventClassification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
            Self::Timeout => "timeout",
            Self::Crash => "crash",
        }
    }

    /// Timeouts and crashes are tracked as `first_failure`; plain errors are not.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Timeout | Self::Crash)
    }
}

impl fmt::Display for EventClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a whole sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceStatus {
    Running,
    /// Every command was attempted.
    CompletedClean,
    /// The service died; remaining commands were not attempted.
    CrashedEarly,
    /// Cancelled from outside.
    Aborted,
}

impl SequenceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::CompletedClean => "completed_clean",
            Self::CrashedEarly => "crashed_early",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for SequenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered commands to run against one long-lived service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSequence {
    /// Dispatcher target name.
    pub target: String,
    pub commands: Vec<String>,
}

impl CommandSequence {
    pub fn new(target: impl Into<String>, commands: Vec<String>) -> Self {
        Self {
            target: target.into(),
            commands,
        }
    }
}

/// Outcome of one command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StabilityEvent {
    /// Zero-based position in the sequence.
    pub index: usize,
    pub command: String,
    pub start_ts: DateTime<Utc>,
    pub duration_ms: u64,
    pub error_message: Option<String>,
    pub classification: EventClassification,
    /// Reply text, truncated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceSummary {
    pub ok: usize,
    pub errors: usize,
    pub timeouts: usize,
    pub crashes: usize,
}

impl SequenceSummary {
    pub fn record(&mut self, classification: EventClassification) {
        match classification {
            EventClassification::Ok => self.ok += 1,
            EventClassification::Error => self.errors += 1,
            EventClassification::Timeout => self.timeouts += 1,
            EventClassification::Crash => self.crashes += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.ok + self.errors + self.timeouts + self.crashes
    }
}

/// Finalized result of probing one sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceReport {
    pub id: Uuid,
    pub target: String,
    pub status: SequenceStatus,
    pub crashed: bool,
    pub hung: bool,
    pub events: Vec<StabilityEvent>,
    pub summary: SequenceSummary,
    pub first_failure: Option<StabilityEvent>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl SequenceReport {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            target: target.into(),
            status: SequenceStatus::Running,
            crashed: false,
            hung: false,
            events: Vec::new(),
            summary: SequenceSummary::default(),
            first_failure: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Append an event and update flags and counters.
    pub fn push(&mut self, event: StabilityEvent) {
        self.summary.record(event.classification);
        match event.classification {
            EventClassification::Timeout => self.hung = true,
            EventClassification::Crash => self.crashed = true,
            _ => {}
        }
        if event.classification.is_failure() && self.first_failure.is_none() {
            self.first_failure = Some(event.clone());
        }
        self.events.push(event);
    }

    /// Close the report with its terminal status.
    pub fn finalize(mut self, status: SequenceStatus) -> Self {
        if status == SequenceStatus::CrashedEarly {
            self.crashed = true;
        }
        self.status = status;
        self.finished_at = Some(Utc::now());
        self
    }

    pub fn is_clean(&self) -> bool {
        self.status == SequenceStatus::CompletedClean && !self.hung && self.summary.errors == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(index: usize, classification: EventClassification) -> StabilityEvent {
        StabilityEvent {
            index,
            command: format!("cmd {index}"),
            start_ts: Utc::now(),
            duration_ms: 1,
            error_message: None,
            classification,
            reply: None,
        }
    }

    #[test]
    fn test_push_tracks_first_failure() {
        let mut report = SequenceReport::new("redis");
        report.push(event(0, EventClassification::Error));
        report.push(event(1, EventClassification::Timeout));
        report.push(event(2, EventClassification::Timeout));

        assert!(report.hung);
        assert!(!report.crashed);
        assert_eq!(report.summary.errors, 1);
        assert_eq!(report.summary.timeouts, 2);
        assert_eq!(report.first_failure.as_ref().map(|e| e.index), Some(1));
    }

    #[test]
    fn test_finalize_crashed_early_sets_flag() {
        let report = SequenceReport::new("redis").finalize(SequenceStatus::CrashedEarly);
        assert!(report.crashed);
        assert!(report.events.is_empty());
        assert!(report.finished_at.is_some());
    }

    #[test]
    fn test_is_clean() {
        let mut report = SequenceReport::new("redis");
        report.push(event(0, EventClassification::Ok));
        assert!(report.finalize(SequenceStatus::CompletedClean).is_clean());
    }
}
