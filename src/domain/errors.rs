//! Domain errors for the Arbiter verification engine.

use thiserror::Error;

/// Failures raised by a [`Dispatcher`](crate::domain::ports::Dispatcher).
///
/// Any of these, when returned from `execute`, counts as the command having
/// raised; the prober then decides between `error` and `crash` with a health
/// re-check.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Unknown target: {0}")]
    UnknownTarget(String),

    #[error("Command rejected by {target}: {message}")]
    CommandFailed { target: String, message: String },

    #[error("Connection to {0} lost")]
    ConnectionLost(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_converts_to_dispatch_error() {
        let err: DispatchError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "redis-cli").into();
        assert!(matches!(err, DispatchError::Io(_)));
        assert_eq!(err.to_string(), "I/O error: redis-cli");
    }

    #[test]
    fn test_command_failed_names_target() {
        let err = DispatchError::CommandFailed {
            target: "mongo".to_string(),
            message: "unknown operator".to_string(),
        };
        assert_eq!(err.to_string(), "Command rejected by mongo: unknown operator");
    }
}
