//! LINE-style webhook payloads.
//!
//! Only the fields the backend uses are modelled; everything else in a
//! platform event is ignored.

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};

/// Prefix namespacing webhook users in the session store.
pub const SESSION_PREFIX: &str = "line:";

#[derive(Debug, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub reply_token: Option<String>,
    #[serde(default)]
    pub source: Option<EventSource>,
    #[serde(default)]
    pub message: Option<EventMessage>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventMessage {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

/// A text message event that carries everything needed for a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEvent {
    pub user_id: String,
    pub reply_token: Option<String>,
    pub text: String,
}

impl TextEvent {
    #[must_use]
    pub fn session_id(&self) -> String {
        session_key(&self.user_id)
    }
}

#[must_use]
pub fn session_key(user_id: &str) -> String {
    format!("{SESSION_PREFIX}{user_id}")
}

impl WebhookEvent {
    fn as_text_event(&self) -> Option<TextEvent> {
        if self.kind != "message" {
            return None;
        }
        let message = self.message.as_ref().filter(|m| m.kind == "text")?;
        let text = message.text.as_deref().filter(|t| !t.trim().is_empty())?;
        let user_id = self
            .source
            .as_ref()
            .and_then(|s| s.user_id.as_deref())
            .filter(|id| !id.trim().is_empty())?;

        Some(TextEvent {
            user_id: user_id.to_string(),
            reply_token: self.reply_token.clone(),
            text: text.to_string(),
        })
    }
}

impl WebhookPayload {
    /// Extract the valid text events, in payload order.
    ///
    /// Fails when the payload has no events at all, or when none of them is a
    /// usable text message.
    pub fn text_events(&self) -> Result<Vec<TextEvent>> {
        if self.events.is_empty() {
            return Err(ApiError::InvalidRequest("No events".to_string()));
        }

        let events: Vec<TextEvent> = self
            .events
            .iter()
            .filter_map(WebhookEvent::as_text_event)
            .collect();

        if events.is_empty() {
            return Err(ApiError::InvalidRequest(
                "No text message events".to_string(),
            ));
        }
        Ok(events)
    }
}

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub replies: Vec<ReplyDescriptor>,
}

/// Reply addressed to one platform user.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyDescriptor {
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_token: Option<String>,
    pub messages: Vec<ReplyMessage>,
}

#[derive(Debug, Serialize)]
pub struct ReplyMessage {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
}

impl ReplyDescriptor {
    #[must_use]
    pub fn text(event: TextEvent, reply: String) -> Self {
        Self {
            to: event.user_id,
            reply_token: event.reply_token,
            messages: vec![ReplyMessage {
                kind: "text",
                text: reply,
            }],
        }
    }
}
