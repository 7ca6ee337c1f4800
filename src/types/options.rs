/// Per-call overrides applied on top of the provider defaults.
///
/// A zero `temperature` or `max_tokens` means "do not override": the server
/// default is used. There is no way to request an explicit temperature of
/// exactly zero through this type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallOptions {
    pub temperature: f32,
    pub max_tokens: u32,
    pub stream: bool,
    /// Model to use for this call; empty means the provider's model.
    pub model: String,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Deliver the reply incrementally instead of as one document.
    pub fn stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_overrides_nothing() {
        let options = CallOptions::default();
        assert_eq!(options.temperature, 0.0);
        assert_eq!(options.max_tokens, 0);
        assert!(!options.stream);
        assert!(options.model.is_empty());
    }

    #[test]
    fn test_builder() {
        let options = CallOptions::new()
            .temperature(0.9)
            .max_tokens(1024)
            .stream(true)
            .model("llama3");
        assert_eq!(options.temperature, 0.9);
        assert_eq!(options.max_tokens, 1024);
        assert!(options.stream);
        assert_eq!(options.model, "llama3");
    }
}
