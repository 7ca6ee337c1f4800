use crate::{CallOptions, Error, Message};
use tokio_util::sync::CancellationToken;

/// A chat-completion backend that turns a transcript into one reply.
///
/// Every call is a single exchange; nothing is retried. `cancel` aborts the
/// exchange while it is connecting or reading.
#[async_trait::async_trait]
pub trait ChatProvider: Send + Sync + 'static {
    /// Generate a reply. With `options.stream` set the reply is read
    /// incrementally, but the full text is still returned.
    async fn chat(
        &self,
        cancel: &CancellationToken,
        messages: &[Message],
        options: &CallOptions,
    ) -> Result<String, Error>;

    /// Model used when a call does not name one.
    fn model(&self) -> &str;

    /// Base URL of the server.
    fn base_url(&self) -> &str;
}
