//! Ollama `/api/chat` provider.

pub mod client;
pub mod stream;
pub mod types;

pub use client::{is_url, OllamaProvider};
pub use stream::TextStream;
