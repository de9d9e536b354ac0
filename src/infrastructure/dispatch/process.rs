//! Subprocess dispatcher
//!
//! Sends each command to a backend by running its client program, e.g.
//! `redis-cli -p 6379 SET k v`, and probes health with a separate program
//! whose exit status decides liveness. The service itself is started and
//! stopped elsewhere.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::process::Stdio;
use tokio::process::Command;

use crate::domain::errors::DispatchError;
use crate::domain::models::{RawReply, TargetConfig};
use crate::domain::ports::Dispatcher;

/// Dispatcher that shells out to per-target client programs.
#[derive(Debug, Clone, Default)]
pub struct ProcessDispatcher {
    targets: BTreeMap<String, TargetConfig>,
}

impl ProcessDispatcher {
    pub fn new(targets: BTreeMap<String, TargetConfig>) -> Self {
        Self { targets }
    }

    fn target(&self, name: &str) -> Result<&TargetConfig, DispatchError> {
        self.targets
            .get(name)
            .ok_or_else(|| DispatchError::UnknownTarget(name.to_string()))
    }

    /// Build the client invocation: configured program and arguments, then
    /// the command's whitespace-separated words.
    fn build_command(program: &[String], command: &str) -> Option<Command> {
        let (binary, args) = program.split_first()?;
        let mut cmd = Command::new(binary);
        cmd.args(args)
            .args(command.split_whitespace())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // The prober may drop this future at its hard deadline.
            .kill_on_drop(true);
        Some(cmd)
    }
}

#[async_trait]
impl Dispatcher for ProcessDispatcher {
    async fn execute(&self, target: &str, command: &str) -> Result<RawReply, DispatchError> {
        let config = self.target(target)?;
        let mut cmd = Self::build_command(&config.command, command)
            .ok_or_else(|| DispatchError::UnknownTarget(target.to_string()))?;

        tracing::trace!(service = %target, command = %command, "Dispatching command");

        let output = cmd.output().await?;
        if !output.status.success() {
            return Err(DispatchError::CommandFailed {
                target: target.to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
        if stdout.is_empty() {
            return Ok(RawReply::kv("nil", Value::Null));
        }
        Ok(RawReply::kv("string", Value::String(stdout)))
    }

    async fn health_check(&self, target: &str) -> bool {
        let Ok(config) = self.target(target) else {
            return false;
        };
        let Some(mut cmd) = Self::build_command(&config.health, "") else {
            return false;
        };

        match cmd.status().await {
            Ok(status) => status.success(),
            Err(err) => {
                tracing::debug!(service = %target, error = %err, "Health probe could not run");
                false
            }
        }
    }
}
