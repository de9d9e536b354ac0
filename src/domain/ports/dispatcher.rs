use crate::domain::errors::DispatchError;
use crate::domain::models::RawReply;
use async_trait::async_trait;

/// Port to the execution dispatcher that owns backend connections.
///
/// Connection parameters and process lifecycle live behind this trait; the
/// engine only issues commands and asks whether a target is still alive.
///
/// # Examples
///
/// ```no_run
/// use arbiter::domain::ports::Dispatcher;
///
/// async fn example(dispatcher: &dyn Dispatcher) {
///     if dispatcher.health_check("redis").await {
///         let _reply = dispatcher.execute("redis", "SET k v").await;
///     }
/// }
/// ```
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Run one command against `target`.
    ///
    /// # Returns
    ///
    /// * `Ok(RawReply)` - The backend answered (its reply may still carry an error string)
    /// * `Err` - The call raised
    async fn execute(&self, target: &str, command: &str) -> Result<RawReply, DispatchError>;

    /// Whether `target` currently answers health probes.
    async fn health_check(&self, target: &str) -> bool;
}
