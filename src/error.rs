use thiserror::Error;

/// Boxed cause carried by transport and stream errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur when talking to a chat provider.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to encode request: {0}")]
    Encoding(#[source] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Transport(#[source] BoxError),

    #[error("Server returned status code: {status}")]
    ServerStatus { status: u16 },

    #[error("Failed to decode response: {0}")]
    Decoding(#[source] serde_json::Error),

    #[error("Provider error: {message}")]
    Provider { message: String },

    #[error("Stream read error: {0}")]
    StreamRead(#[source] BoxError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// The caller's cancellation token fired before the exchange finished.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("request cancelled")]
pub struct Cancelled;

impl Error {
    pub fn provider(message: impl Into<String>) -> Self {
        Error::Provider {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }

    pub fn transport(cause: impl Into<BoxError>) -> Self {
        Error::Transport(cause.into())
    }

    pub fn stream_read(cause: impl Into<BoxError>) -> Self {
        Error::StreamRead(cause.into())
    }

    /// HTTP status code, if the server rejected the request.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::ServerStatus { status } => Some(*status),
            _ => None,
        }
    }

    /// Whether this error was caused by the caller cancelling the call.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Error::Transport(cause) | Error::StreamRead(cause) => cause.is::<Cancelled>(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_status_only_for_server_errors() {
        assert_eq!(Error::ServerStatus { status: 500 }.status(), Some(500));
        assert_eq!(Error::provider("boom").status(), None);
    }

    #[test]
    fn test_cancelled_is_wrapped_as_source() {
        let error = Error::transport(Cancelled);
        assert!(error.is_cancelled());
        assert!(error.source().unwrap().downcast_ref::<Cancelled>().is_some());

        let error = Error::stream_read("connection reset");
        assert!(!error.is_cancelled());
        assert!(error.to_string().contains("connection reset"));
    }

    #[test]
    fn test_provider_message_in_display() {
        let error = Error::provider("model not found");
        assert_eq!(error.to_string(), "Provider error: model not found");
    }
}
