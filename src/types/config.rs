use crate::Error;
use std::env;
use std::time::Duration;

/// Timeout for establishing a TCP connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Interval between TCP keep-alive probes on pooled connections.
pub const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(30);
/// Upper bound on a whole exchange, including reading a streamed body.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection settings for a chat provider.
///
/// Empty or invalid `base_url` and empty `model` are accepted here and
/// replaced with the provider defaults when the provider is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub base_url: String,
    pub model: String,
    pub connect_timeout: Duration,
    pub keep_alive: Duration,
    pub request_timeout: Duration,
}

impl ProviderConfig {
    /// Create configuration with default network timeouts.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            keep_alive: DEFAULT_KEEP_ALIVE,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_keep_alive(mut self, interval: Duration) -> Self {
        self.keep_alive = interval;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Create configuration from environment variables.
    ///
    /// Reads `OLLAMA_BASE_URL`, `OLLAMA_MODEL`, `OLLAMA_CONNECT_TIMEOUT_SECS`,
    /// `OLLAMA_KEEP_ALIVE_SECS` and `OLLAMA_REQUEST_TIMEOUT_SECS`. Unset
    /// variables fall back to the defaults.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let seconds = |key: &str, default: Duration| -> Result<Duration, Error> {
            match lookup(key) {
                Some(raw) => raw.trim().parse::<u64>().map(Duration::from_secs).map_err(|_| {
                    Error::config(format!("{key} must be a whole number of seconds, got '{raw}'"))
                }),
                None => Ok(default),
            }
        };

        Ok(Self {
            base_url: lookup("OLLAMA_BASE_URL").unwrap_or_default(),
            model: lookup("OLLAMA_MODEL").unwrap_or_default(),
            connect_timeout: seconds("OLLAMA_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT)?,
            keep_alive: seconds("OLLAMA_KEEP_ALIVE_SECS", DEFAULT_KEEP_ALIVE)?,
            request_timeout: seconds("OLLAMA_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT)?,
        })
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::new(String::new(), String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ProviderConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ProviderConfig::default());
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_reads_all_variables() {
        let config = ProviderConfig::from_lookup(lookup(&[
            ("OLLAMA_BASE_URL", "http://gpu-box:11434"),
            ("OLLAMA_MODEL", "llama3"),
            ("OLLAMA_CONNECT_TIMEOUT_SECS", "2"),
            ("OLLAMA_KEEP_ALIVE_SECS", "10"),
            ("OLLAMA_REQUEST_TIMEOUT_SECS", " 120 "),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://gpu-box:11434");
        assert_eq!(config.model, "llama3");
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.keep_alive, Duration::from_secs(10));
        assert_eq!(config.request_timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_rejects_malformed_timeout() {
        let err = ProviderConfig::from_lookup(lookup(&[("OLLAMA_REQUEST_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("OLLAMA_REQUEST_TIMEOUT_SECS"));
    }
}
