//! Multi-turn conversation in the terminal.
//!
//! Uses the same session store and persona composition as the HTTP backend,
//! so a terminal session behaves exactly like an API session.

use parley_config::Config;
use parley_conversation::TurnContext;
use parley_core::CompletionOptions;
use tracing::info;
use uuid::Uuid;

/// Input parameters for the Chat command strategy.
#[derive(Debug, Clone)]
pub struct ChatInput {
    /// Session key (generated if not provided)
    pub session_id: Option<String>,
    /// Persona key
    pub agent: Option<String>,
    /// Optional single message to send (non-interactive mode)
    pub message: Option<String>,
    /// Optional model override
    pub model: Option<String>,
    /// Optional temperature override
    pub temperature: Option<f32>,
}

/// Strategy for executing the Chat command.
#[derive(Debug, Clone, Copy)]
pub struct ChatStrategy;

impl super::CommandStrategy for ChatStrategy {
    type Input = ChatInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let manager = super::build_manager(&config);

        let session_id = input
            .session_id
            .unwrap_or_else(|| format!("cli:{}", Uuid::now_v7()));
        let persona = input.agent.or_else(|| config.agents.defaults.persona.clone());
        let options = CompletionOptions::new(
            input.model,
            input.temperature.or(config.agents.defaults.temperature),
        );

        info!("Starting conversation session: {session_id}");

        if let Some(msg) = input.message {
            let context = TurnContext::new(msg)
                .with_persona(persona)
                .with_options(options);
            let reply = manager.generate_reply(&session_id, context).await?;
            println!("{reply}");
        } else {
            manager.run_interactive(&session_id, persona, options).await?;
        }

        Ok(())
    }
}
