#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

mod error;

pub use error::ProviderError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

/// One role-tagged turn of a conversation.
///
/// Only `role` and `content` survive deserialization; any other field a
/// client attaches to a turn is dropped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}

/// Per-call overrides passed to a provider. `None` means "use the provider default".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionOptions {
    pub model: Option<String>,
    pub temperature: Option<f32>,
}

impl CompletionOptions {
    #[must_use]
    pub const fn new(model: Option<String>, temperature: Option<f32>) -> Self {
        Self { model, temperature }
    }
}

#[derive(Debug, Clone)]
pub struct LLMResponse {
    pub content: String,
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[async_trait]
pub trait LLMProvider: Send + Sync {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<LLMResponse, ProviderError>;

    fn get_default_model(&self) -> &str;
}

#[async_trait]
impl<T: LLMProvider + ?Sized> LLMProvider for std::sync::Arc<T> {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<LLMResponse, ProviderError> {
        (**self).chat(messages, options).await
    }

    fn get_default_model(&self) -> &str {
        (**self).get_default_model()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn extra_turn_fields_are_dropped() {
        let raw = r#"{"role":"user","content":"hi","name":"mallory","tool_calls":[]}"#;
        let msg: ChatMessage = serde_json::from_str(raw).expect("turn should deserialize");
        assert_eq!(msg, ChatMessage::user("hi"));

        let back = serde_json::to_value(&msg).expect("turn should serialize");
        assert_eq!(back, serde_json::json!({"role": "user", "content": "hi"}));
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Role::Assistant).ok().as_deref(),
            Some("\"assistant\"")
        );
        assert_eq!(Role::System.as_str(), "system");
    }

    #[test]
    fn unknown_role_is_rejected() {
        let raw = r#"{"role":"wizard","content":"hi"}"#;
        assert!(serde_json::from_str::<ChatMessage>(raw).is_err());
    }
}
