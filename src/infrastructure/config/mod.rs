//! Configuration loading
//!
//! Defaults, `.arbiter/*.yaml` files and `ARBITER_*` environment variables
//! are merged with figment, then validated before any check runs.

pub mod loader;

pub use loader::{ConfigError, ConfigLoader};
