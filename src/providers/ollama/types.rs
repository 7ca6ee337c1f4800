use crate::types::Message;
use serde::{Deserialize, Serialize, Serializer};

/// Ollama `/api/chat` request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<ModelOptions>,
}

/// Sampling overrides; only keys that were set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModelOptions {
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "finite_temperature"
    )]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<u32>,
}

impl ModelOptions {
    pub fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.num_predict.is_none()
    }
}

// JSON has no NaN or infinity; serde_json would silently write `null`.
fn finite_temperature<S>(value: &Option<f32>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(t) if !t.is_finite() => Err(serde::ser::Error::custom(format!(
            "temperature must be a finite number, got {t}"
        ))),
        _ => value.serialize(serializer),
    }
}

/// One response record: the whole buffered reply, or one streamed line.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatChunk {
    #[serde(default)]
    pub message: Option<ChunkMessage>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub done: bool,
}

/// Message body inside a response record. The role is not needed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatChunk {
    /// Server-reported error, if non-empty.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|m| !m.is_empty())
    }

    /// Text carried by a streamed record; only the top-level `content`.
    pub fn fragment(self) -> Option<String> {
        self.content.filter(|c| !c.is_empty())
    }

    /// `message.content` of a buffered reply.
    pub fn message_content(self) -> Option<String> {
        self.message.and_then(|m| m.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_options_omitted_when_absent() {
        let request = ChatRequest {
            model: "m".to_string(),
            messages: vec![Message::user("Hi")],
            stream: false,
            options: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "model": "m",
                "messages": [{"role": "user", "content": "Hi"}],
                "stream": false
            })
        );
    }

    #[test]
    fn test_only_set_option_keys_are_sent() {
        let options = ModelOptions {
            temperature: None,
            num_predict: Some(512),
        };
        assert_eq!(serde_json::to_value(&options).unwrap(), json!({"num_predict": 512}));
    }

    #[test]
    fn test_non_finite_temperature_fails_to_encode() {
        let options = ModelOptions {
            temperature: Some(f32::NAN),
            num_predict: None,
        };
        let err = serde_json::to_vec(&options).unwrap_err();
        assert!(err.to_string().contains("finite"));
    }

    #[test]
    fn test_chunk_tolerates_missing_and_unknown_fields() {
        let chunk: ChatChunk = serde_json::from_str(
            r#"{"model":"x","created_at":"2024-01-01T00:00:00Z","content":"hi","done":false}"#,
        )
        .unwrap();
        assert!(!chunk.done);
        assert_eq!(chunk.error_message(), None);
        assert_eq!(chunk.fragment(), Some("hi".to_string()));

        let chunk: ChatChunk = serde_json::from_str(r#"{"done":true}"#).unwrap();
        assert!(chunk.done);
        assert_eq!(chunk.fragment(), None);
    }

    #[test]
    fn test_fragment_ignores_message_content() {
        let chunk: ChatChunk =
            serde_json::from_str(r#"{"message":{"role":"assistant","content":"x"}}"#).unwrap();
        assert_eq!(chunk.fragment(), None);

        let chunk: ChatChunk =
            serde_json::from_str(r#"{"content":"a","message":{"content":"b"}}"#).unwrap();
        assert_eq!(chunk.fragment(), Some("a".to_string()));
    }

    #[test]
    fn test_message_content_of_buffered_reply() {
        let chunk: ChatChunk =
            serde_json::from_str(r#"{"message":{"content":"hello from mock"}}"#).unwrap();
        assert_eq!(chunk.message_content(), Some("hello from mock".to_string()));
    }

    #[test]
    fn test_empty_error_is_not_an_error() {
        let chunk: ChatChunk = serde_json::from_str(r#"{"error":"","content":"x"}"#).unwrap();
        assert_eq!(chunk.error_message(), None);
    }
}
