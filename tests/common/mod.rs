//! Common test utilities for integration tests
//!
//! Provides a scripted [`Dispatcher`] and shared helpers used across
//! multiple integration test files.

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use arbiter::domain::models::{ProberConfig, RawReply};
use arbiter::{DispatchError, Dispatcher};

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
#[allow(dead_code)]
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Prober settings used by the scenario tests: 3s budget, 6s hard cut-off.
#[allow(dead_code)]
pub fn prober_config() -> ProberConfig {
    ProberConfig {
        command_timeout_ms: 3000,
        hard_timeout_ms: 6000,
        health_retries: 2,
        health_interval_ms: 100,
        health_timeout_ms: 500,
        max_reply_chars: 64,
    }
}

/// What the scripted backend does for one command.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub enum Step {
    /// Reply after the delay.
    Reply(Duration),
    /// Raise after the delay; the service stays healthy.
    Fail(Duration, String),
    /// Raise and take the service down.
    Kill(String),
}

/// Dispatcher whose behaviour is scripted per command text.
///
/// Commands without a script reply `"OK"` immediately.
#[derive(Default)]
pub struct ScriptedDispatcher {
    steps: HashMap<String, Step>,
    down: AtomicBool,
    calls: Mutex<Vec<(String, String)>>,
}

#[allow(dead_code)]
impl ScriptedDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, command: &str, step: Step) -> Self {
        self.steps.insert(command.to_string(), step);
        self
    }

    /// Start with the service already down.
    pub fn down(self) -> Self {
        self.down.store(true, Ordering::SeqCst);
        self
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.down.store(!healthy, Ordering::SeqCst);
    }

    /// `(target, command)` pairs in call order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn commands_for(&self, target: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|(t, _)| t == target)
            .map(|(_, command)| command)
            .collect()
    }
}

#[async_trait]
impl Dispatcher for ScriptedDispatcher {
    async fn execute(&self, target: &str, command: &str) -> Result<RawReply, DispatchError> {
        self.calls
            .lock()
            .unwrap()
            .push((target.to_string(), command.to_string()));

        match self.steps.get(command).cloned() {
            None => Ok(RawReply::kv("string", json!("OK"))),
            Some(Step::Reply(delay)) => {
                tokio::time::sleep(delay).await;
                Ok(RawReply::kv("string", json!("OK")))
            }
            Some(Step::Fail(delay, message)) => {
                tokio::time::sleep(delay).await;
                Err(DispatchError::CommandFailed {
                    target: target.to_string(),
                    message,
                })
            }
            Some(Step::Kill(message)) => {
                self.down.store(true, Ordering::SeqCst);
                Err(DispatchError::ConnectionLost(message))
            }
        }
    }

    async fn health_check(&self, _target: &str) -> bool {
        !self.down.load(Ordering::SeqCst)
    }
}
