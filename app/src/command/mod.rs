//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy with its own input type, dispatched
//! statically from `main`.

use parley_config::Config;
use parley_conversation::{ConversationManager, PersonaRegistry, SessionStore};
use parley_core::LLMProvider;
use parley_providers::OpenAIProvider;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

mod chat;
mod info;
mod init;
mod serve;
mod version;

pub use chat::{ChatInput, ChatStrategy};
pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use serve::{ServeInput, ServeStrategy};
pub use version::VersionStrategy;

/// Build the provider described by `config`.
fn build_provider(config: &Config) -> OpenAIProvider {
    let openai = &config.providers.openai;
    OpenAIProvider::new(openai.api_key.clone())
        .with_base_url(openai.base_url.clone())
        .with_default_model(config.agents.defaults.model.clone())
        .with_reasoning_model_prefixes(openai.reasoning_model_prefixes.clone())
        .with_request_timeout(openai.request_timeout_secs.map(Duration::from_secs))
}

/// Wire provider, session store and persona registry into one manager.
fn build_manager(config: &Config) -> ConversationManager {
    let provider: Arc<dyn LLMProvider> = Arc::new(build_provider(config));
    let store = Arc::new(SessionStore::new(config.sessions.max_messages));
    let personas = Arc::new(PersonaRegistry::builtin());
    for key in unknown_personas(config, &personas) {
        warn!("Configured persona {key:?} is not registered; the default persona will be used");
    }

    let gateway_timeout = config.sessions.gateway_timeout_secs.map(Duration::from_secs);
    if gateway_timeout.is_none() {
        info!("No gateway timeout configured; completions may wait indefinitely");
    }

    ConversationManager::new(provider, store, personas).with_gateway_timeout(gateway_timeout)
}

/// Configured persona keys the registry does not know.
fn unknown_personas<'a>(config: &'a Config, personas: &PersonaRegistry) -> Vec<&'a str> {
    let defaults = &config.agents.defaults;
    [defaults.persona.as_deref(), defaults.webhook_persona.as_deref()]
        .into_iter()
        .flatten()
        .filter(|key| !key.trim().is_empty() && !personas.contains(key))
        .collect()
}

/// Core trait defining the contract for all command strategies.
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}
