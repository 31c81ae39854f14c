/// Convenience result type used across the preview bridge.
pub type PreviewResult<T> = Result<T, PreviewError>;

/// Top-level error taxonomy used by the bridge APIs.
///
/// Untrusted, malformed or unmatched inbound messages are not errors; they are dropped at the
/// transport boundary and reported as [`crate::Delivery::Dropped`].
#[derive(thiserror::Error, Debug)]
pub enum PreviewError {
    /// Invalid user-provided configuration, token or state data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A reply arrived but did not carry the fields the request expects.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The embedded surface refused an outbound message.
    #[error("transport error: {0}")]
    Transport(String),

    /// The channel was disposed before (or while) the operation could complete.
    #[error("channel closed")]
    ChannelClosed,

    /// No reply arrived for a pending request within the configured timeout.
    #[error("request {id} timed out after {timeout_ms} ms")]
    Timeout {
        /// Correlation id of the abandoned request.
        id: u64,
        /// Timeout that elapsed, in milliseconds.
        timeout_ms: u64,
    },

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PreviewError {
    /// Build a [`PreviewError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PreviewError::Protocol`] value.
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Build a [`PreviewError::Transport`] value.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Build a [`PreviewError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Whether this error reports a closed channel.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::ChannelClosed)
    }
}

impl From<serde_json::Error> for PreviewError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
