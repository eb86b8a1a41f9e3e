//! UI-agnostic conversation types
//!
//! These are shared between the session reducer, the Ollama client and any
//! front end. They carry no rendering concerns.

use serde::{Deserialize, Serialize};

/// A single turn in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Who authored a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// Body of a streaming chat request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatTurn>,
    pub stream: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_lowercase_roles() {
        let request = ChatRequest {
            model: "qwen2.5-coder:7b".to_string(),
            messages: vec![ChatTurn::user("hi"), ChatTurn::assistant("hello")],
            stream: true,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "qwen2.5-coder:7b");
        assert_eq!(value["stream"], true);
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][1]["role"], "assistant");
        assert_eq!(value["messages"][1]["content"], "hello");
    }
}
