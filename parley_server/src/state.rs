use std::sync::Arc;

use parley_conversation::ConversationManager;

/// Fallbacks applied when a request leaves a field unset.
#[derive(Debug, Clone, Default)]
pub struct RequestDefaults {
    /// Persona for API requests without an `agent`
    pub persona: Option<String>,
    /// Persona for messaging-webhook turns
    pub webhook_persona: Option<String>,
    /// Temperature for requests without one
    pub temperature: Option<f32>,
}

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<ConversationManager>,
    pub defaults: Arc<RequestDefaults>,
}

impl AppState {
    #[must_use]
    pub fn new(manager: ConversationManager, defaults: RequestDefaults) -> Self {
        Self {
            manager: Arc::new(manager),
            defaults: Arc::new(defaults),
        }
    }
}
