//! Infrastructure layer module
//!
//! This module contains the adapters around the verification core:
//! - Configuration management
//! - Logging infrastructure
//! - Subprocess dispatcher
//! - JSON-lines record output
//!
//! Infrastructure implementations satisfy the port traits defined in the domain layer.

pub mod config;
pub mod dispatch;
pub mod logging;
pub mod reporting;
