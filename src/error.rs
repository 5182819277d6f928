// MIT License - Copyright (c) 2026 Peter Wright
// Error types

/// All errors that can occur in the satel-event-log library.
///
/// Only connection establishment and code table loading reach the caller.
/// Protocol-level problems during a log read end that log class and are
/// reported through [`ClassOutcome`](crate::reader::ClassOutcome) instead.
#[derive(Debug, thiserror::Error)]
pub enum SatelError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection timeout: {addr}")]
    ConnectionTimeout { addr: String },

    #[error("No response within the request timeout")]
    RequestTimeout,

    #[error("Connection closed by panel")]
    Disconnected,

    #[error("Invalid event code table: {0}")]
    InvalidCodeTable(#[from] serde_json::Error),
}

impl SatelError {
    /// Whether this error is a request-level timeout rather than a broken connection.
    pub fn is_timeout(&self) -> bool {
        matches!(self, SatelError::RequestTimeout)
    }
}

pub type Result<T> = std::result::Result<T, SatelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_timeout() {
        assert!(SatelError::RequestTimeout.is_timeout());
        assert!(!SatelError::Disconnected.is_timeout());
        assert!(!SatelError::ConnectionTimeout {
            addr: "10.0.0.1:7094".to_string()
        }
        .is_timeout());
    }

    #[test]
    fn test_display() {
        let err = SatelError::ConnectionTimeout {
            addr: "10.0.0.1:7094".to_string(),
        };
        assert_eq!(err.to_string(), "Connection timeout: 10.0.0.1:7094");
    }
}
