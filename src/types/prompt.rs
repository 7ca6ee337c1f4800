use super::message::Message;

/// An ordered conversation transcript.
///
/// Messages are kept exactly in the order they were added; the provider
/// sends them to the server in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prompt {
    messages: Vec<Message>,
}

impl Prompt {
    /// Create a new empty prompt.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a prompt with a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(content)],
        }
    }

    /// Create a prompt with a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(content)],
        }
    }

    /// Add a system message.
    pub fn with_system(mut self, content: impl Into<String>) -> Self {
        self.messages.push(Message::system(content));
        self
    }

    /// Add a user message.
    pub fn with_user(mut self, content: impl Into<String>) -> Self {
        self.messages.push(Message::user(content));
        self
    }

    /// Add an assistant message.
    pub fn with_assistant(mut self, content: impl Into<String>) -> Self {
        self.messages.push(Message::assistant(content));
        self
    }

    /// Add a message.
    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Add multiple messages.
    pub fn with_messages(mut self, messages: impl IntoIterator<Item = Message>) -> Self {
        self.messages.extend(messages);
        self
    }

    /// Record a model reply so the next call carries the conversation history.
    pub fn push_reply(&mut self, reply: impl Into<String>) {
        self.messages.push(Message::assistant(reply));
    }

    /// Get the messages.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl From<&str> for Prompt {
    fn from(s: &str) -> Self {
        Prompt::user(s)
    }
}

impl From<String> for Prompt {
    fn from(s: String) -> Self {
        Prompt::user(s)
    }
}

impl From<Message> for Prompt {
    fn from(message: Message) -> Self {
        Prompt {
            messages: vec![message],
        }
    }
}

impl From<Vec<Message>> for Prompt {
    fn from(messages: Vec<Message>) -> Self {
        Prompt { messages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    #[test]
    fn test_builder_preserves_order() {
        let prompt = Prompt::system("You are terse")
            .with_user("Hello")
            .with_assistant("Hi")
            .with_user("Bye");

        let roles: Vec<Role> = prompt.messages().iter().map(|m| m.role()).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::User, Role::Assistant, Role::User]
        );
        assert_eq!(prompt.messages()[3].content, "Bye");
    }

    #[test]
    fn test_push_reply_appends_assistant() {
        let mut prompt: Prompt = "What is Rust?".into();
        prompt.push_reply("A language.");

        assert_eq!(prompt.len(), 2);
        assert_eq!(prompt.messages()[1], Message::assistant("A language."));
    }

    #[test]
    fn test_duplicates_are_kept() {
        let prompt = Prompt::new().with_messages(vec![Message::user("x"), Message::user("x")]);
        assert_eq!(prompt.len(), 2);
    }
}
