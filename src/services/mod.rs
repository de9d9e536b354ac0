//! Verification services.
//!
//! Normalizer, comparator, policy evaluator and TLP verifier are pure and
//! synchronous; only the stability prober and its pool perform I/O, through
//! the [`Dispatcher`](crate::domain::ports::Dispatcher) port.

pub mod comparator;
pub mod normalizer;
pub mod oracle_policy;
pub mod sequence_pool;
pub mod stability_prober;
pub mod tlp_verifier;

pub use comparator::MultisetComparator;
pub use normalizer::Normalizer;
pub use oracle_policy::OracleChecker;
pub use sequence_pool::{PoolReport, SequencePool};
pub use stability_prober::StabilityProber;
pub use tlp_verifier::{TlpInput, TlpVerifier};
