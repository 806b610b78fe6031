use crate::command::CommandStrategy;
use parley_config::Config;
use parley_server::{AppState, RequestDefaults, build_router};
use tracing::{info, warn};

/// Input for the serve command.
pub struct ServeInput {
    /// Optional bind host (overrides config)
    pub host: Option<String>,
    /// Optional port (overrides config)
    pub port: Option<u16>,
}

/// Strategy for running the HTTP backend.
pub struct ServeStrategy;

impl CommandStrategy for ServeStrategy {
    type Input = ServeInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let mut config = Config::load()?;
        if let Some(host) = input.host {
            config.server.host = host;
        }
        if let Some(port) = input.port {
            config.server.port = port;
        }

        if config.providers.openai.api_key.is_none() {
            warn!("No OpenAI API key configured; chat requests will fail until OPENAI_API_KEY is set");
        }

        let manager = super::build_manager(&config);
        let defaults = RequestDefaults {
            persona: config.agents.defaults.persona.clone(),
            webhook_persona: config.agents.defaults.webhook_persona.clone(),
            temperature: config.agents.defaults.temperature,
        };

        let router = build_router(
            AppState::new(manager, defaults),
            &config.server.cors_allowed_origins,
        );

        let addr = config.server.bind_address();
        info!(
            "Starting parley backend on {addr} (model={}, max_messages={})",
            config.agents.defaults.model, config.sessions.max_messages
        );
        parley_server::serve(router, &addr).await?;

        Ok(())
    }
}
