//! Domain layer for the Arbiter verification engine
//!
//! This module contains the canonical data model, error taxonomy and ports.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::DispatchError;
