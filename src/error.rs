//! Error types for the sync-events library.

use thiserror::Error;

/// Type alias for Results in this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for sync-events
#[derive(Error, Debug)]
pub enum Error {
    /// A subscriber type declared the same message type more than once
    #[error("subscriber `{subscriber}` declares more than one handler for `{message}`")]
    AmbiguousInterest {
        /// Type name of the offending subscriber
        subscriber: &'static str,
        /// Type name of the message declared twice
        message: &'static str,
    },

    /// A handler requires UI-thread marshalling on a bus without a marshaller
    #[error("handler for `{message}` requires UI marshalling, but no marshaller is configured")]
    MarshallerMissing {
        /// Type name of the message whose handler needed marshalling
        message: &'static str,
    },

    /// A subscriber's handling method failed
    #[error("handler error: {0}")]
    Handler(String),

    /// Generic internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new handler error with a custom message
    pub fn handler(msg: impl Into<String>) -> Self {
        Error::Handler(msg.into())
    }

    /// Create a new internal error with a custom message
    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }

    /// Check if this error indicates a bus misconfiguration rather than a
    /// handler failure
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::AmbiguousInterest { .. } | Error::MarshallerMissing { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::handler("boom");
        assert_eq!(err.to_string(), "handler error: boom");

        let err = Error::MarshallerMissing { message: "Ping" };
        assert_eq!(
            err.to_string(),
            "handler for `Ping` requires UI marshalling, but no marshaller is configured"
        );
    }

    #[test]
    fn test_error_is_configuration() {
        assert!(Error::MarshallerMissing { message: "Ping" }.is_configuration());
        assert!(Error::AmbiguousInterest {
            subscriber: "Panel",
            message: "Ping"
        }
        .is_configuration());
        assert!(!Error::handler("boom").is_configuration());
        assert!(!Error::internal("bug").is_configuration());
    }
}
