use super::stream::{cancellable, decode, ChunkStream, TextStream};
use super::types::{ChatChunk, ChatRequest, ModelOptions};
use crate::error::Cancelled;
use crate::ndjson_stream::NdjsonStreamExt;
use crate::provider::ChatProvider;
use crate::{CallOptions, Error, Message, ProviderConfig};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Ollama chat provider.
///
/// Holds no mutable state after construction and can be shared across
/// tasks; the underlying HTTP client pools connections.
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Client,
    config: ProviderConfig,
}

impl OllamaProvider {
    /// Base URL used when the configured one is empty or invalid.
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:11434";
    /// Model used when none is configured.
    pub const DEFAULT_MODEL: &'static str = "deepseek-r1:8b";

    /// Create a new provider. An invalid base URL or an empty model name is
    /// replaced by the defaults.
    ///
    /// # Panics
    /// Panics if the HTTP client cannot be built, which only happens when the
    /// TLS backend fails to initialise. Use [`OllamaProvider::try_with_config`]
    /// to handle that case.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_config(ProviderConfig::new(base_url, model))
    }

    /// Create a provider with custom network settings.
    ///
    /// # Panics
    /// Panics if the HTTP client cannot be built. See
    /// [`OllamaProvider::try_with_config`].
    pub fn with_config(config: ProviderConfig) -> Self {
        match Self::try_with_config(config) {
            Ok(provider) => provider,
            Err(e) => panic!("{e}"),
        }
    }

    /// Create a provider with custom network settings, returning
    /// [`Error::Transport`] if the HTTP client cannot be built.
    pub fn try_with_config(config: ProviderConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .tcp_keepalive(config.keep_alive)
            .build()
            .map_err(Error::transport)?;

        Ok(Self::with_client(config, client))
    }

    /// Create a provider around an existing HTTP client.
    pub fn with_client(mut config: ProviderConfig, client: Client) -> Self {
        if !is_url(&config.base_url) {
            warn!(
                base_url = %config.base_url,
                fallback = Self::DEFAULT_BASE_URL,
                "invalid base URL, using default"
            );
            config.base_url = Self::DEFAULT_BASE_URL.to_string();
        }

        if config.model.is_empty() {
            warn!(fallback = Self::DEFAULT_MODEL, "no model configured, using default");
            config.model = Self::DEFAULT_MODEL.to_string();
        }

        Self { client, config }
    }

    /// Default model for calls that do not name one.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Base URL of the server, as configured.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Effective configuration, after defaults were applied.
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Stream a reply as a pull-based sequence of text fragments.
    ///
    /// The request is sent before this returns, so transport and status
    /// errors surface here; decoding errors surface as stream items.
    pub async fn stream_chat(
        &self,
        cancel: &CancellationToken,
        messages: &[Message],
        options: &CallOptions,
    ) -> Result<TextStream, Error> {
        let request = self.build_request(messages, options);
        self.invoke_stream(cancel, request).await
    }

    /// Merge per-call options with the provider defaults.
    pub(crate) fn build_request(&self, messages: &[Message], options: &CallOptions) -> ChatRequest {
        let model = if options.model.is_empty() {
            self.config.model.clone()
        } else {
            options.model.clone()
        };

        let overrides = ModelOptions {
            temperature: (options.temperature != 0.0).then_some(options.temperature),
            num_predict: (options.max_tokens > 0).then_some(options.max_tokens),
        };

        ChatRequest {
            model,
            messages: messages.to_vec(),
            stream: options.stream,
            options: (!overrides.is_empty()).then_some(overrides),
        }
    }

    /// Stream a reply into `on_chunk`. A missing callback is rejected before
    /// any network work.
    pub(crate) async fn chat_stream(
        &self,
        cancel: &CancellationToken,
        messages: &[Message],
        options: &CallOptions,
        on_chunk: Option<&mut (dyn FnMut(&str) + Send)>,
    ) -> Result<(), Error> {
        let on_chunk = on_chunk
            .ok_or_else(|| Error::invalid_argument("on_chunk callback cannot be None"))?;

        let request = self.build_request(messages, options);
        let fragments = self.invoke_stream(cancel, request).await?;
        let text = decode(fragments, on_chunk).await?;

        debug!(len = text.len(), "chat stream completed");
        Ok(())
    }

    /// Buffered exchange: one request, one JSON document back.
    async fn invoke(&self, cancel: &CancellationToken, request: &ChatRequest) -> Result<String, Error> {
        let response = self.send(cancel, request).await?;

        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::transport(Cancelled)),
            body = response.bytes() => body.map_err(Error::transport),
        };
        let body = body?;

        let chunk: ChatChunk = serde_json::from_slice(&body).map_err(Error::Decoding)?;
        if let Some(message) = chunk.error_message() {
            return Err(Error::provider(message));
        }

        Ok(chunk.message_content().unwrap_or_default())
    }

    /// Streaming exchange: the body is decoded line by line as it arrives.
    async fn invoke_stream(
        &self,
        cancel: &CancellationToken,
        mut request: ChatRequest,
    ) -> Result<TextStream, Error> {
        request.stream = true;
        let response = self.send(cancel, &request).await?;

        let lines = Box::pin(response.bytes_stream()).ndjson_lines();
        Ok(cancellable(ChunkStream::new(lines), cancel.clone()))
    }

    /// Serialize and POST `request`, returning the response once its
    /// status is known to be a success.
    async fn send(
        &self,
        cancel: &CancellationToken,
        request: &ChatRequest,
    ) -> Result<reqwest::Response, Error> {
        let body = serde_json::to_vec(request).map_err(Error::Encoding)?;
        let url = self.chat_url()?;

        debug!(
            model = %request.model,
            messages = request.messages.len(),
            stream = request.stream,
            "sending chat request"
        );

        let pending = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send();

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::transport(Cancelled)),
            response = pending => response.map_err(Error::transport),
        };
        let response = response?;

        let status = response.status().as_u16();
        if status >= 300 {
            return Err(Error::ServerStatus { status });
        }

        Ok(response)
    }

    /// `{base_url}/api/chat`, keeping any path prefix of the base URL.
    fn chat_url(&self) -> Result<Url, Error> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| Error::config(format!("invalid base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| Error::config("base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(["api", "chat"]);
        Ok(url)
    }
}

#[async_trait::async_trait]
impl ChatProvider for OllamaProvider {
    async fn chat(
        &self,
        cancel: &CancellationToken,
        messages: &[Message],
        options: &CallOptions,
    ) -> Result<String, Error> {
        if options.stream {
            let mut buffer = String::new();
            let sink: &mut (dyn FnMut(&str) + Send) =
                &mut |fragment: &str| buffer.push_str(fragment);
            self.chat_stream(cancel, messages, options, Some(sink)).await?;
            return Ok(buffer);
        }

        let request = self.build_request(messages, options);
        self.invoke(cancel, &request).await
    }

    fn model(&self) -> &str {
        OllamaProvider::model(self)
    }

    fn base_url(&self) -> &str {
        OllamaProvider::base_url(self)
    }
}

/// Whether `candidate` is an absolute `http`/`https` URL with a host,
/// written as `scheme://authority`.
pub fn is_url(candidate: &str) -> bool {
    let Some((scheme, _)) = candidate.split_once("://") else {
        return false;
    };
    if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
        return false;
    }

    match Url::parse(candidate) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some_and(|host| !host.is_empty())
        }
        Err(_) => false,
    }
}
