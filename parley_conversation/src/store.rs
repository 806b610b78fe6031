//! In-memory session store.
//!
//! One mutex guards the whole map. Every read and every read-modify-write
//! happens under it, so concurrent appends to the same session serialize
//! instead of losing updates. The lock is never held across a provider call.

use std::collections::HashMap;

use parley_core::{ChatMessage, Role};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use crate::session::ConversationSession;

pub const DEFAULT_MAX_MESSAGES: usize = 40;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("System turns cannot be stored in session history")]
    SystemRoleRejected,
}

#[derive(Debug)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, ConversationSession>>,
    max_messages: usize,
}

impl SessionStore {
    #[must_use]
    pub fn new(max_messages: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            max_messages: max_messages.max(1),
        }
    }

    /// Snapshot of a session's turns, oldest first. Unknown sessions are empty.
    pub async fn get_history(&self, session_id: &str) -> Vec<ChatMessage> {
        let sessions = self.sessions.lock().await;
        sessions
            .get(session_id)
            .map(|session| session.messages().to_vec())
            .unwrap_or_default()
    }

    /// Append one turn, creating the session on first use.
    pub async fn append(
        &self,
        session_id: &str,
        role: Role,
        content: impl Into<String>,
    ) -> Result<(), SessionError> {
        if role == Role::System {
            return Err(SessionError::SystemRoleRejected);
        }

        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| ConversationSession::new(self.max_messages));
        session.add_message(role, content.into());
        debug!(
            "Appended {} turn to session {session_id} ({} stored)",
            role.as_str(),
            session.message_count()
        );
        Ok(())
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    #[must_use]
    pub const fn max_messages(&self) -> usize {
        self.max_messages
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MESSAGES)
    }
}
