//! Crash/hang stability prober.
//!
//! Runs an ordered command sequence against one long-lived service and
//! classifies each command as `ok`, `error`, `timeout` or `crash`. The
//! sequence stops at the first crash; timeouts and errors never halt it.
//!
//! Every dispatcher call runs under a hard deadline, so a stuck backend is
//! reclassified instead of blocking the worker.

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::domain::models::{
    CommandSequence, EventClassification, ProberConfig, RawReply, SequenceReport, SequenceStatus,
    StabilityEvent,
};
use crate::domain::ports::Dispatcher;

/// Result of the pre-flight health probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Preflight {
    Healthy,
    Unhealthy,
    Cancelled,
}

/// Sequential crash/hang classifier for one service at a time.
pub struct StabilityProber {
    dispatcher: Arc<dyn Dispatcher>,
    config: ProberConfig,
}

impl StabilityProber {
    pub fn new(dispatcher: Arc<dyn Dispatcher>, config: ProberConfig) -> Self {
        Self { dispatcher, config }
    }

    pub fn config(&self) -> &ProberConfig {
        &self.config
    }

    /// Probe a sequence that cannot be cancelled.
    pub async fn probe(&self, sequence: &CommandSequence) -> SequenceReport {
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        self.probe_with_shutdown(sequence, shutdown_rx).await
    }

    /// Probe a sequence, aborting when `shutdown` flips to `true`.
    ///
    /// Always returns a finalized report: `CompletedClean` when every command
    /// was attempted, `CrashedEarly` on a crash or failed pre-flight, and
    /// `Aborted` on cancellation with the events collected so far.
    pub async fn probe_with_shutdown(
        &self,
        sequence: &CommandSequence,
        mut shutdown: watch::Receiver<bool>,
    ) -> SequenceReport {
        let target = sequence.target.as_str();
        let mut report = SequenceReport::new(target);

        tracing::info!(
            service = %target,
            sequence_id = %report.id,
            commands = sequence.commands.len(),
            "Starting stability probe"
        );

        match self.preflight(target, &mut shutdown).await {
            Preflight::Healthy => {}
            Preflight::Unhealthy => {
                tracing::error!(
                    service = %target,
                    retries = self.config.health_retries,
                    "Service unhealthy before first command"
                );
                return report.finalize(SequenceStatus::CrashedEarly);
            }
            Preflight::Cancelled => return Self::abort(report),
        }

        for (index, command) in sequence.commands.iter().enumerate() {
            if *shutdown.borrow() {
                return Self::abort(report);
            }

            let event = tokio::select! {
                event = self.run_command(target, index, command) => event,
                () = cancelled(&mut shutdown) => return Self::abort(report),
            };

            let classification = event.classification;
            report.push(event);

            if classification == EventClassification::Crash {
                tracing::error!(
                    service = %target,
                    index = index,
                    command = %command,
                    "Service crashed, stopping sequence"
                );
                return report.finalize(SequenceStatus::CrashedEarly);
            }
        }

        tracing::info!(
            service = %target,
            ok = report.summary.ok,
            errors = report.summary.errors,
            timeouts = report.summary.timeouts,
            hung = report.hung,
            "Stability probe completed"
        );

        report.finalize(SequenceStatus::CompletedClean)
    }

    /// Execute one command under the hard deadline and classify it.
    async fn run_command(&self, target: &str, index: usize, command: &str) -> StabilityEvent {
        let start_ts = Utc::now();
        let started = Instant::now();
        let outcome = tokio::time::timeout(
            self.config.hard_timeout(),
            self.dispatcher.execute(target, command),
        )
        .await;
        let elapsed = started.elapsed();

        let (classification, error_message, reply) = match outcome {
            Ok(Ok(reply)) => match reply_error(&reply) {
                Some(message) => {
                    let classification = self.classify_raised(target).await;
                    (classification, Some(message), Some(self.truncate(&reply.preview())))
                }
                None if elapsed >= self.config.command_timeout() => {
                    (EventClassification::Timeout, None, Some(self.truncate(&reply.preview())))
                }
                None => (EventClassification::Ok, None, Some(self.truncate(&reply.preview()))),
            },
            Ok(Err(err)) => {
                let classification = self.classify_raised(target).await;
                (classification, Some(err.to_string()), None)
            }
            Err(_) => {
                let message = format!(
                    "no reply within {}ms",
                    self.config.hard_timeout().as_millis()
                );
                let classification = if self.health_probe(target).await {
                    EventClassification::Timeout
                } else {
                    EventClassification::Crash
                };
                (classification, Some(message), None)
            }
        };

        let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        match classification {
            EventClassification::Ok => tracing::debug!(
                service = %target,
                index = index,
                duration_ms = duration_ms,
                "Command ok"
            ),
            EventClassification::Error => tracing::warn!(
                service = %target,
                index = index,
                error = error_message.as_deref().unwrap_or_default(),
                "Command failed, service still healthy"
            ),
            EventClassification::Timeout => tracing::warn!(
                service = %target,
                index = index,
                duration_ms = duration_ms,
                budget_ms = self.config.command_timeout_ms,
                "Command exceeded its time budget"
            ),
            EventClassification::Crash => {}
        }

        StabilityEvent {
            index,
            command: command.to_string(),
            start_ts,
            duration_ms,
            error_message,
            classification,
            reply,
        }
    }

    /// A command raised: `error` if the service still answers, otherwise `crash`.
    async fn classify_raised(&self, target: &str) -> EventClassification {
        if self.health_probe(target).await {
            EventClassification::Error
        } else {
            EventClassification::Crash
        }
    }

    /// Bounded retry loop before the first command.
    async fn preflight(&self, target: &str, shutdown: &mut watch::Receiver<bool>) -> Preflight {
        let attempts = self.config.health_retries.max(1);
        for attempt in 1..=attempts {
            let healthy = tokio::select! {
                healthy = self.health_probe(target) => healthy,
                () = cancelled(shutdown) => return Preflight::Cancelled,
            };
            if healthy {
                return Preflight::Healthy;
            }

            tracing::debug!(
                service = %target,
                attempt = attempt,
                attempts = attempts,
                "Pre-flight health probe failed"
            );

            if attempt < attempts {
                tokio::select! {
                    () = tokio::time::sleep(self.config.health_interval()) => {}
                    () = cancelled(shutdown) => return Preflight::Cancelled,
                }
            }
        }
        Preflight::Unhealthy
    }

    /// Single health probe; a probe that outlives its budget counts as unhealthy.
    async fn health_probe(&self, target: &str) -> bool {
        match tokio::time::timeout(
            self.config.health_timeout(),
            self.dispatcher.health_check(target),
        )
        .await
        {
            Ok(healthy) => healthy,
            Err(_) => {
                tracing::warn!(
                    service = %target,
                    timeout_ms = self.config.health_timeout_ms,
                    "Health probe timed out"
                );
                false
            }
        }
    }

    fn truncate(&self, text: &str) -> String {
        truncate_chars(text, self.config.max_reply_chars)
    }

    fn abort(report: SequenceReport) -> SequenceReport {
        tracing::info!(
            service = %report.target,
            events = report.events.len(),
            "Stability probe aborted"
        );
        report.finalize(SequenceStatus::Aborted)
    }
}

/// Error string carried inside an otherwise successful reply.
fn reply_error(reply: &RawReply) -> Option<String> {
    match reply {
        RawReply::Relational {
            error: Some(error), ..
        } => Some(error.clone()),
        RawReply::Canonical(result) => result.error.clone(),
        _ => None,
    }
}

/// Resolves once `shutdown` reads `true`; never resolves if the sender is gone.
async fn cancelled(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Keep at most `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text.to_string(),
    }
}
