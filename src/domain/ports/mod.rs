//! Port trait definitions (Hexagonal Architecture)
//!
//! - Dispatcher: executes commands against test backends and probes their health
//!
//! The verification services depend only on these traits, never on a
//! concrete backend adapter.

pub mod dispatcher;

pub use dispatcher::Dispatcher;
