use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub agents: AgentsConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub sessions: SessionsConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AgentsConfig {
    #[serde(default)]
    pub defaults: AgentDefaults,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AgentDefaults {
    #[serde(default = "AgentDefaults::default_model")]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Persona used when a request names none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<String>,
    /// Persona used for messaging-webhook turns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_persona: Option<String>,
}

impl Default for AgentDefaults {
    fn default() -> Self {
        Self {
            model: Self::default_model(),
            temperature: None,
            persona: None,
            webhook_persona: None,
        }
    }
}

impl AgentDefaults {
    fn default_model() -> String {
        "gpt-5".to_string()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openai: ProviderConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "ProviderConfig::default_base_url")]
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    #[serde(default = "ProviderConfig::default_reasoning_model_prefixes")]
    pub reasoning_model_prefixes: Vec<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: Self::default_base_url(),
            request_timeout_secs: None,
            reasoning_model_prefixes: Self::default_reasoning_model_prefixes(),
        }
    }
}

impl ProviderConfig {
    fn default_base_url() -> String {
        "https://api.openai.com/v1".to_string()
    }

    fn default_reasoning_model_prefixes() -> Vec<String> {
        vec!["gpt-5".to_string()]
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionsConfig {
    #[serde(default = "SessionsConfig::default_max_messages")]
    pub max_messages: usize,
    /// Upper bound on a single completion call. Unset means wait indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_timeout_secs: Option<u64>,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            max_messages: Self::default_max_messages(),
            gateway_timeout_secs: None,
        }
    }
}

impl SessionsConfig {
    const fn default_max_messages() -> usize {
        40
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "ServerConfig::default_host")]
    pub host: String,
    #[serde(default = "ServerConfig::default_port")]
    pub port: u16,
    #[serde(default = "ServerConfig::default_cors_allowed_origins")]
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            cors_allowed_origins: Self::default_cors_allowed_origins(),
        }
    }
}

impl ServerConfig {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    const fn default_port() -> u16 {
        8000
    }

    fn default_cors_allowed_origins() -> Vec<String> {
        vec!["*".to_string()]
    }

    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Config {
    /// Load `~/parley/config.json` (defaults when absent), then apply
    /// environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path()?;
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if !config_path.exists() {
            info!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Invalid config file {}: {e}", config_path.display())
        })?;
        info!("Loaded config from {}", config_path.display());

        Ok(config)
    }

    /// Overlay `OPENAI_API_KEY`, `OPENAI_MODEL`, `OPENAI_BASE_URL` and
    /// `PARLEY_PORT`. Blank values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(api_key) = get("OPENAI_API_KEY") {
            debug!("Using OPENAI_API_KEY from environment");
            self.providers.openai.api_key = Some(api_key);
        }
        if let Some(model) = get("OPENAI_MODEL") {
            self.agents.defaults.model = model;
        }
        if let Some(base_url) = get("OPENAI_BASE_URL") {
            self.providers.openai.base_url = base_url;
        }
        if let Some(port) = get("PARLEY_PORT").and_then(|p| p.trim().parse().ok()) {
            self.server.port = port;
        }
    }

    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("parley"))
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join("config.json");

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        let config_template = r#"{
  "agents": {
    "defaults": {
      "model": "gpt-5",
      "persona": "default",
      "webhook_persona": "sale"
    }
  },
  "providers": {
    "openai": {
      "api_key": "your-openai-api-key-here",
      "base_url": "https://api.openai.com/v1",
      "request_timeout_secs": 120,
      "reasoning_model_prefixes": ["gpt-5"]
    }
  },
  "sessions": {
    "max_messages": 40,
    "gateway_timeout_secs": 120
  },
  "server": {
    "host": "0.0.0.0",
    "port": 8000,
    "cors_allowed_origins": ["*"]
  }
}"#;

        std::fs::write(&config_path, config_template)?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Edit the config file and add your OpenAI API key (or set OPENAI_API_KEY)");
        println!("   2. Run 'parley serve' to start the HTTP backend");
        println!("   3. Or run 'parley chat' for a terminal conversation");
        println!();
        println!("🔧 Configuration options:");
        println!("   - model: default completion model (OPENAI_MODEL overrides)");
        println!("   - sessions.max_messages: turns kept per session");
        println!("   - sessions.gateway_timeout_secs: give up on a completion after this long");
        println!();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn empty_document_uses_defaults() {
        let config: Config = serde_json::from_str("{}").expect("empty config should parse");
        assert_eq!(config.agents.defaults.model, "gpt-5");
        assert_eq!(config.sessions.max_messages, 40);
        assert!(config.sessions.gateway_timeout_secs.is_none());
        assert_eq!(config.server.bind_address(), "0.0.0.0:8000");
        assert_eq!(config.server.cors_allowed_origins, vec!["*".to_string()]);
        assert_eq!(
            config.providers.openai.reasoning_model_prefixes,
            vec!["gpt-5".to_string()]
        );
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn partial_sections_keep_other_defaults() {
        let raw = r#"{"sessions": {"gateway_timeout_secs": 30}, "server": {"port": 9000}}"#;
        let config: Config = serde_json::from_str(raw).expect("partial config should parse");
        assert_eq!(config.sessions.max_messages, 40);
        assert_eq!(config.sessions.gateway_timeout_secs, Some(30));
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn env_overrides_apply_and_blank_values_are_ignored() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL", "gpt-4o"),
            ("OPENAI_BASE_URL", "  "),
            ("PARLEY_PORT", "8123"),
        ]);
        let mut config = Config::default();
        config.apply_env_overrides(|key| env.get(key).map(ToString::to_string));

        assert_eq!(config.providers.openai.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.agents.defaults.model, "gpt-4o");
        assert_eq!(config.providers.openai.base_url, "https://api.openai.com/v1");
        assert_eq!(config.server.port, 8123);
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("parley-config-does-not-exist.json");
        let config = Config::load_from(&path).expect("missing file should not fail");
        assert_eq!(config.sessions.max_messages, 40);
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn invalid_file_reports_path() {
        let path = std::env::temp_dir().join(format!("parley-invalid-{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").expect("temp file should be writable");
        let err = Config::load_from(&path).expect_err("invalid json should fail");
        let _ = std::fs::remove_file(&path);
        assert!(err.to_string().contains("Invalid config file"));
    }
}
