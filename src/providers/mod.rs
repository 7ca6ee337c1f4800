//! Provider implementations for chat-completion services.

pub mod ollama;

// Re-export commonly used provider types
pub use ollama::OllamaProvider;
