use parley_config::Config;
use parley_conversation::PersonaRegistry;

/// Strategy for displaying the effective configuration.
///
/// Shows the masked API key, provider and agent defaults, session limits,
/// server settings and the registered personas.
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;

        println!("=== parley Configuration ===\n");

        println!("Config file: {}", Config::config_path()?.display());
        println!();

        println!("Provider:");
        println!(
            "  API Key: {}",
            config
                .providers
                .openai
                .api_key
                .as_deref()
                .map_or_else(|| "(not set)".to_string(), mask_secret)
        );
        println!("  Base URL: {}", config.providers.openai.base_url);
        println!(
            "  Reasoning Models: {}",
            config.providers.openai.reasoning_model_prefixes.join(", ")
        );
        if let Some(secs) = config.providers.openai.request_timeout_secs {
            println!("  Request Timeout: {secs}s");
        }
        println!();

        println!("Agent Defaults:");
        println!("  Model: {}", config.agents.defaults.model);
        if let Some(temperature) = config.agents.defaults.temperature {
            println!("  Temperature: {temperature}");
        }
        println!(
            "  Persona: {}",
            config.agents.defaults.persona.as_deref().unwrap_or("default")
        );
        println!(
            "  Webhook Persona: {}",
            config
                .agents
                .defaults
                .webhook_persona
                .as_deref()
                .unwrap_or("default")
        );
        println!(
            "  Available Personas: {}",
            PersonaRegistry::builtin().names().join(", ")
        );
        println!();

        println!("Sessions:");
        println!("  Max Messages: {}", config.sessions.max_messages);
        match config.sessions.gateway_timeout_secs {
            Some(secs) => println!("  Gateway Timeout: {secs}s"),
            None => println!("  Gateway Timeout: (none)"),
        }
        println!();

        println!("Server:");
        println!("  Bind: {}", config.server.bind_address());
        println!(
            "  CORS Origins: {}",
            config.server.cors_allowed_origins.join(", ")
        );

        Ok(())
    }
}

fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "***".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_secrets_show_head_and_tail() {
        assert_eq!(mask_secret("sk-abcdefghijklmnop"), "sk-a...mnop");
    }

    #[test]
    fn short_secrets_are_fully_hidden() {
        assert_eq!(mask_secret("short"), "***");
    }
}
