//! Dispatcher adapters
//!
//! Concrete implementations of the [`Dispatcher`](crate::domain::ports::Dispatcher) port.

pub mod process;

pub use process::ProcessDispatcher;
