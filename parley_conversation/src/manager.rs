//! Conversation manager for multi-turn dialogue.
//!
//! The `ConversationManager` sequences a turn: record the user message,
//! snapshot the session, compose with the persona, call the provider, record
//! the reply. It also offers a stateless path that skips the session entirely.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use parley_core::{ChatMessage, CompletionOptions, LLMProvider, ProviderError, Role};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::compose::compose;
use crate::persona::PersonaRegistry;
use crate::store::{SessionError, SessionStore};

/// Errors that can occur during conversation management.
#[derive(Debug, Error)]
pub enum ConversationError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything a single turn needs besides the session id.
#[derive(Debug, Clone, Default)]
pub struct TurnContext {
    /// User's input message
    pub user_input: String,
    /// Persona key; `None` selects the default persona
    pub persona: Option<String>,
    /// Model and temperature overrides
    pub options: CompletionOptions,
}

impl TurnContext {
    #[must_use]
    pub fn new(user_input: impl Into<String>) -> Self {
        Self {
            user_input: user_input.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_persona(mut self, persona: Option<String>) -> Self {
        self.persona = persona;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }
}

pub struct ConversationManager<P = Arc<dyn LLMProvider>>
where
    P: Send + Sync,
{
    provider: P,
    store: Arc<SessionStore>,
    personas: Arc<PersonaRegistry>,
    gateway_timeout: Option<Duration>,
}

impl<P> ConversationManager<P>
where
    P: LLMProvider + Send + Sync,
{
    #[must_use]
    pub fn new(provider: P, store: Arc<SessionStore>, personas: Arc<PersonaRegistry>) -> Self {
        info!(
            "Creating conversation manager (max_messages={})",
            store.max_messages()
        );
        Self {
            provider,
            store,
            personas,
            gateway_timeout: None,
        }
    }

    /// Bound each provider call. Without this a call that never returns
    /// blocks its turn indefinitely.
    #[must_use]
    pub const fn with_gateway_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.gateway_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    #[must_use]
    pub const fn personas(&self) -> &Arc<PersonaRegistry> {
        &self.personas
    }

    /// Run one session-scoped turn and return the reply text.
    ///
    /// The user turn is committed before the provider is called and is not
    /// rolled back if the call fails; in that case no assistant turn is
    /// stored and the provider error is returned as-is.
    pub async fn generate_reply(
        &self,
        session_id: &str,
        context: TurnContext,
    ) -> Result<String, ConversationError> {
        self.store
            .append(session_id, Role::User, context.user_input)
            .await?;

        let history = self.store.get_history(session_id).await;
        let messages = compose(&history, &self.personas, context.persona.as_deref());
        info!(
            "Processing turn for session {session_id}: {} history messages",
            history.len()
        );

        let reply = match self.call_provider(&messages, &context.options).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Turn for session {session_id} failed: {e}");
                return Err(e.into());
            }
        };

        self.store
            .append(session_id, Role::Assistant, reply.clone())
            .await?;
        debug!("Turn for session {session_id} completed");

        Ok(reply)
    }

    /// Stateless completion over caller-supplied turns. No session is read or written.
    pub async fn complete(
        &self,
        turns: &[ChatMessage],
        persona: Option<&str>,
        options: &CompletionOptions,
    ) -> Result<String, ConversationError> {
        let messages = compose(turns, &self.personas, persona);
        debug!("Stateless completion with {} messages", messages.len());
        Ok(self.call_provider(&messages, options).await?)
    }

    async fn call_provider(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<String, ProviderError> {
        debug!(
            "Calling provider: model={}, messages={}",
            options
                .model
                .as_deref()
                .unwrap_or_else(|| self.provider.get_default_model()),
            messages.len()
        );
        let call = self.provider.chat(messages, options);
        let response = match self.gateway_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| ProviderError::Timeout(limit))??,
            None => call.await?,
        };
        Ok(response.content)
    }

    /// Run an interactive conversation loop on stdin/stdout for one session.
    pub async fn run_interactive(
        &self,
        session_id: &str,
        persona: Option<String>,
        options: CompletionOptions,
    ) -> Result<(), ConversationError> {
        println!("=== Conversation Session: {session_id} ===");
        println!("Type 'exit', 'quit', or Ctrl+C to end the session.\n");

        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let mut input = String::new();
            if std::io::stdin().read_line(&mut input)? == 0 {
                break;
            }
            let input = input.trim();

            if matches!(input, "exit" | "quit" | "q") {
                let stored = self.store.get_history(session_id).await.len();
                println!("\nSession ended. {stored} messages in history.");
                break;
            }

            if input.is_empty() {
                continue;
            }

            let context = TurnContext::new(input)
                .with_persona(persona.clone())
                .with_options(options.clone());

            match self.generate_reply(session_id, context).await {
                Ok(reply) => println!("\n{reply}\n"),
                Err(e) => eprintln!("Error: {e}"),
            }
        }

        Ok(())
    }
}
