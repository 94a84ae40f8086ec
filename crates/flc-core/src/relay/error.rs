//! Relay error types.

/// Errors surfaced by the relay client.
///
/// "No event found" is not an error; queries resolve with `None` instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    /// The environment has no WebSocket support.
    #[error("Merge mining relay unavailable.")]
    Unavailable,

    /// Connecting to or writing to the relay failed.
    #[error("Relay connection failed: {0}")]
    Connection(String),

    /// A frame could not be encoded or decoded.
    #[error("Relay protocol error: {0}")]
    Protocol(String),
}

impl From<serde_json::Error> for RelayError {
    fn from(e: serde_json::Error) -> Self {
        RelayError::Protocol(e.to_string())
    }
}
