//! Bounded per-session history.
//!
//! A session keeps only user and assistant turns, oldest first, and never
//! grows past its window: once full, each new turn pushes out the oldest.

use parley_core::{ChatMessage, Role};

#[derive(Debug, Clone)]
pub struct ConversationSession {
    /// Message history, oldest first
    messages: Vec<ChatMessage>,
    /// Maximum number of retained messages
    max_messages: usize,
}

impl ConversationSession {
    /// Create an empty session with the given window. A window of zero is
    /// treated as one so the newest turn is always retained.
    #[must_use]
    pub fn new(max_messages: usize) -> Self {
        Self {
            messages: Vec::new(),
            max_messages: max_messages.max(1),
        }
    }

    /// Append a turn, then drop from the front until the window fits.
    pub fn add_message(&mut self, role: Role, content: String) {
        self.messages.push(ChatMessage { role, content });
        let overflow = self.messages.len().saturating_sub(self.max_messages);
        if overflow > 0 {
            self.messages.drain(..overflow);
        }
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub const fn message_count(&self) -> usize {
        self.messages.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(session: &ConversationSession) -> Vec<&str> {
        session.messages().iter().map(|m| m.content.as_str()).collect()
    }

    #[test]
    fn sliding_window_keeps_newest() {
        let mut session = ConversationSession::new(3);
        session.add_message(Role::User, "u1".into());
        session.add_message(Role::Assistant, "a1".into());
        session.add_message(Role::User, "u2".into());
        session.add_message(Role::Assistant, "a2".into());
        session.add_message(Role::User, "u3".into());

        assert_eq!(contents(&session), vec!["u2", "a2", "u3"]);
    }

    #[test]
    fn length_never_exceeds_window() {
        let mut session = ConversationSession::new(4);
        for i in 0..25 {
            session.add_message(Role::User, format!("m{i}"));
            assert!(session.message_count() <= 4);
        }
        assert_eq!(contents(&session), vec!["m21", "m22", "m23", "m24"]);
    }

    #[test]
    fn zero_window_still_retains_latest() {
        let mut session = ConversationSession::new(0);
        assert_eq!(session.message_count(), 0);
        session.add_message(Role::User, "a".into());
        session.add_message(Role::User, "b".into());
        assert_eq!(contents(&session), vec!["b"]);
    }
}
