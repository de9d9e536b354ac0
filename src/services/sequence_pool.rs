//! Bounded worker pool for independent stability sequences.
//!
//! Sequences are independent, so they run concurrently up to
//! `max_concurrent_sequences`. Each one is still probed strictly in order by
//! the [`StabilityProber`].

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Semaphore};

use crate::domain::models::{CommandSequence, PoolConfig, SequenceReport};
use crate::services::stability_prober::StabilityProber;

/// Reports of every sequence that ran, plus the ones never started.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoolReport {
    /// Finalized reports in input order.
    pub reports: Vec<SequenceReport>,

    /// Sequences not started because of the failure budget or cancellation.
    pub skipped: Vec<CommandSequence>,

    /// Whether the failure budget stopped scheduling.
    pub budget_exhausted: bool,
}

impl PoolReport {
    pub fn crashed(&self) -> usize {
        self.reports.iter().filter(|r| r.crashed).count()
    }

    pub fn hung(&self) -> usize {
        self.reports.iter().filter(|r| r.hung).count()
    }
}

/// Runs many sequences over a shared prober.
pub struct SequencePool {
    prober: Arc<StabilityProber>,
    config: PoolConfig,
}

impl SequencePool {
    pub fn new(prober: Arc<StabilityProber>, config: PoolConfig) -> Self {
        Self { prober, config }
    }

    /// Probe all `sequences`, stopping new work once the failure budget is
    /// spent or `shutdown` flips to `true`.
    pub async fn run(
        &self,
        sequences: Vec<CommandSequence>,
        shutdown: watch::Receiver<bool>,
    ) -> PoolReport {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_sequences.max(1)));
        let crashes = Arc::new(AtomicUsize::new(0));
        let mut handles = Vec::with_capacity(sequences.len());
        let mut skipped = Vec::new();
        let mut budget_exhausted = false;

        tracing::info!(
            sequences = sequences.len(),
            max_concurrent = self.config.max_concurrent_sequences,
            failure_budget = ?self.config.failure_budget,
            "Starting sequence pool"
        );

        for sequence in sequences {
            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                skipped.push(sequence);
                continue;
            };

            if self.budget_spent(crashes.load(Ordering::SeqCst)) {
                budget_exhausted = true;
                skipped.push(sequence);
                continue;
            }
            if *shutdown.borrow() {
                skipped.push(sequence);
                continue;
            }

            let prober = self.prober.clone();
            let crashes = crashes.clone();
            let shutdown = shutdown.clone();

            handles.push(tokio::spawn(async move {
                let _permit = permit;
                let report = prober.probe_with_shutdown(&sequence, shutdown).await;
                if report.crashed {
                    crashes.fetch_add(1, Ordering::SeqCst);
                }
                report
            }));
        }

        let mut reports = Vec::with_capacity(handles.len());
        for joined in join_all(handles).await {
            match joined {
                Ok(report) => reports.push(report),
                Err(err) => tracing::error!(error = %err, "Sequence task failed"),
            }
        }

        if !skipped.is_empty() {
            tracing::warn!(
                skipped = skipped.len(),
                budget_exhausted = budget_exhausted,
                "Sequences were not started"
            );
        }

        PoolReport {
            reports,
            skipped,
            budget_exhausted,
        }
    }

    fn budget_spent(&self, crashes: usize) -> bool {
        self.config
            .failure_budget
            .is_some_and(|budget| crashes >= budget)
    }
}
