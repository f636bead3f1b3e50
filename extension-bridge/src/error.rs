use std::time::Duration;
use thiserror::Error;

/// Failures of the underlying messaging facility.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Messaging facility is not available")]
    Unavailable,

    /// Delivery failed on the channel itself: no listener, extension disabled or uninstalled.
    #[error("Could not establish connection: {0}")]
    NoReceiver(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON frame: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("Frame of {size} bytes exceeds limit of {limit} bytes")]
    FrameTooLarge { size: usize, limit: usize },

    #[error("Frame truncated: expected {expected} bytes")]
    TruncatedFrame { expected: usize },
}

/// Why a bridge operation resolved to `false`.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Extension messaging is not available in this environment")]
    Unavailable,

    #[error("Extension unreachable: {0}")]
    Unreachable(#[from] TransportError),

    #[error("Invalid request: {0}")]
    Precondition(&'static str),

    #[error("Malformed response: {0}")]
    Protocol(String),

    #[error("Extension rejected {kind}: {reason}")]
    Rejected { kind: &'static str, reason: String },

    #[error("No response within {0:?}")]
    Timeout(Duration),
}

impl BridgeError {
    /// True when the extension simply isn't there, as opposed to misbehaving.
    pub fn is_not_installed(&self) -> bool {
        matches!(
            self,
            BridgeError::Unavailable
                | BridgeError::Unreachable(TransportError::Unavailable)
                | BridgeError::Unreachable(TransportError::NoReceiver(_))
        )
    }
}
