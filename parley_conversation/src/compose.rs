//! Outbound message composition.

use parley_core::{ChatMessage, Role};

use crate::persona::PersonaRegistry;

/// Build the exact sequence sent to the provider.
///
/// Caller-supplied `system` turns are dropped so the persona instruction can
/// never be overridden or suppressed; the resolved persona becomes the sole
/// leading system turn. The input is left untouched.
#[must_use]
pub fn compose(
    turns: &[ChatMessage],
    personas: &PersonaRegistry,
    persona: Option<&str>,
) -> Vec<ChatMessage> {
    let mut composed = Vec::with_capacity(turns.len() + 1);
    composed.push(ChatMessage::system(personas.resolve(persona)));
    composed.extend(
        turns
            .iter()
            .filter(|turn| turn.role != Role::System)
            .map(|turn| ChatMessage::new(turn.role, turn.content.clone())),
    );
    composed
}
