//! Chat-completion client for Ollama-compatible servers.
//!
//! Sends a conversation to `/api/chat` and returns the generated text,
//! either as one buffered document or read incrementally from a
//! newline-delimited stream.

pub mod error;
pub mod ndjson_stream;
pub mod provider;
pub mod providers;
pub mod types;

// Re-export core types for easy usage
pub use error::{Cancelled, Error};
pub use provider::ChatProvider;
pub use providers::ollama::TextStream;
pub use providers::*;
pub use types::*;
pub use tokio_util::sync::CancellationToken;
