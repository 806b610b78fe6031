//! Request handlers.

use axum::Json;
use axum::extract::{Path, State};
use parley_conversation::TurnContext;
use parley_core::{ChatMessage, CompletionOptions, Role};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::webhook::{ReplyDescriptor, TextEvent, WebhookPayload, WebhookResponse};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Persona key
    #[serde(default)]
    pub agent: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub session_id: String,
    pub messages: Vec<ChatMessage>,
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `POST /api/chat`
///
/// Without a `session_id` the supplied messages are completed as-is. With
/// one, the last user message becomes the next turn of that session and any
/// earlier messages in the body are ignored.
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    let persona = request
        .agent
        .clone()
        .or_else(|| state.defaults.persona.clone());
    let options = CompletionOptions::new(
        request.model.clone(),
        request.temperature.or(state.defaults.temperature),
    );

    let session_id = request.session_id.filter(|id| !id.trim().is_empty());

    let Some(session_id) = session_id else {
        let reply = state
            .manager
            .complete(&request.messages, persona.as_deref(), &options)
            .await?;
        return Ok(Json(ChatResponse {
            reply,
            session_id: None,
        }));
    };

    let user_text = request
        .messages
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.clone())
        .ok_or_else(|| ApiError::InvalidRequest("No user message to send".to_string()))?;

    let context = TurnContext::new(user_text)
        .with_persona(persona)
        .with_options(options);
    let reply = state.manager.generate_reply(&session_id, context).await?;

    Ok(Json(ChatResponse {
        reply,
        session_id: Some(session_id),
    }))
}

/// `POST /webhooks/line`
///
/// Each valid text event is a turn on its user's session. Events run one at
/// a time in payload order, and the first failed turn fails the request
/// before any later event is touched.
pub async fn line_webhook(
    State(state): State<AppState>,
    Json(payload): Json<WebhookPayload>,
) -> Result<Json<WebhookResponse>> {
    let events = payload.text_events()?;
    info!("Webhook delivered {} text events", events.len());

    let mut replies = Vec::with_capacity(events.len());
    for event in events {
        replies.push(reply_to_event(&state, event).await?);
    }

    Ok(Json(WebhookResponse { replies }))
}

async fn reply_to_event(state: &AppState, event: TextEvent) -> Result<ReplyDescriptor> {
    let session_id = event.session_id();
    info!("[{}] Message received", event.user_id);

    let context = TurnContext::new(event.text.clone())
        .with_persona(state.defaults.webhook_persona.clone())
        .with_options(CompletionOptions::new(None, state.defaults.temperature));
    let reply = state.manager.generate_reply(&session_id, context).await?;

    Ok(ReplyDescriptor::text(event, reply))
}

/// `GET /api/sessions/{id}`
pub async fn session_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<HistoryResponse> {
    let messages = state.manager.store().get_history(&session_id).await;
    Json(HistoryResponse {
        session_id,
        messages,
    })
}
