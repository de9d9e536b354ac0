use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Main configuration structure for Arbiter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Stability prober timing
    #[serde(default)]
    pub prober: ProberConfig,

    /// Sequence worker pool
    #[serde(default)]
    pub pool: PoolConfig,

    /// Oracle policy switches
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Verdict record output
    #[serde(default)]
    pub reporting: ReportingConfig,

    /// Subprocess dispatcher targets, keyed by target name
    #[serde(default)]
    pub targets: BTreeMap<String, TargetConfig>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stdout only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,

    /// Rotation: daily, hourly, never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

/// Stability prober timing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProberConfig {
    /// Per-command budget; a slower command is classified `timeout`
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,

    /// Hard cut-off after which a pending call is cancelled
    #[serde(default = "default_hard_timeout_ms")]
    pub hard_timeout_ms: u64,

    /// Pre-flight health probe attempts
    #[serde(default = "default_health_retries")]
    pub health_retries: u32,

    /// Delay between pre-flight attempts
    #[serde(default = "default_health_interval_ms")]
    pub health_interval_ms: u64,

    /// Budget for a single health probe
    #[serde(default = "default_health_timeout_ms")]
    pub health_timeout_ms: u64,

    /// Captured reply text is truncated to this many characters
    #[serde(default = "default_max_reply_chars")]
    pub max_reply_chars: usize,
}

const fn default_command_timeout_ms() -> u64 {
    3000
}

const fn default_hard_timeout_ms() -> u64 {
    6000
}

const fn default_health_retries() -> u32 {
    5
}

const fn default_health_interval_ms() -> u64 {
    1000
}

const fn default_health_timeout_ms() -> u64 {
    2000
}

const fn default_max_reply_chars() -> usize {
    512
}

impl ProberConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    pub fn hard_timeout(&self) -> Duration {
        Duration::from_millis(self.hard_timeout_ms)
    }

    pub fn health_interval(&self) -> Duration {
        Duration::from_millis(self.health_interval_ms)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_millis(self.health_timeout_ms)
    }
}

impl Default for ProberConfig {
    fn default() -> Self {
        Self {
            command_timeout_ms: default_command_timeout_ms(),
            hard_timeout_ms: default_hard_timeout_ms(),
            health_retries: default_health_retries(),
            health_interval_ms: default_health_interval_ms(),
            health_timeout_ms: default_health_timeout_ms(),
            max_reply_chars: default_max_reply_chars(),
        }
    }
}

/// Sequence worker pool
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PoolConfig {
    /// Sequences probed at the same time
    #[serde(default = "default_max_concurrent_sequences")]
    pub max_concurrent_sequences: usize,

    /// Crashed sequences tolerated before no new sequence is started
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_budget: Option<usize>,
}

const fn default_max_concurrent_sequences() -> usize {
    4
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_concurrent_sequences: default_max_concurrent_sequences(),
            failure_budget: None,
        }
    }
}

/// Oracle policy switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PolicyConfig {
    /// Treat a single `0` row and a single `None` row as the same answer
    #[serde(default)]
    pub zero_count_equals_null_row: bool,
}

/// Verdict record output
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ReportingConfig {
    /// JSON-lines file that receives one record per check
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records_path: Option<String>,
}

/// Subprocess dispatcher target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TargetConfig {
    /// Program and leading arguments; the command's words are appended
    pub command: Vec<String>,

    /// Program and arguments of the health probe; exit status 0 means healthy
    pub health: Vec<String>,
}
