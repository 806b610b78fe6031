//! Persona ("agent") registry.
//!
//! A persona is a fixed system instruction selected by a short key. The
//! registry is built once at startup and shared read-only.

use std::collections::HashMap;

pub const DEFAULT_PERSONA: &str = "default";

const DEFAULT_INSTRUCTION: &str = "You are a helpful, concise assistant.";

const SALE_INSTRUCTION: &str = "You are Sale, a proactive sales assistant. Qualify leads, ask clarifying questions, \
recommend relevant products/services with clear benefits and pricing when possible, \
handle objections empathetically, and move toward a concrete next step (trial, demo, or purchase). \
Be concise, structured, and action-oriented.";

/// Maps normalized persona keys to system instructions.
#[derive(Debug, Clone)]
pub struct PersonaRegistry {
    personas: HashMap<String, String>,
}

impl PersonaRegistry {
    /// Registry with only the default persona.
    #[must_use]
    pub fn new() -> Self {
        let mut personas = HashMap::new();
        personas.insert(DEFAULT_PERSONA.to_string(), DEFAULT_INSTRUCTION.to_string());
        Self { personas }
    }

    /// Registry with every built-in persona.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new().with_persona("sale", SALE_INSTRUCTION)
    }

    /// Register (or replace) a persona. Registering `default` replaces the fallback.
    #[must_use]
    pub fn with_persona(mut self, key: &str, instruction: impl Into<String>) -> Self {
        self.personas.insert(normalize(key), instruction.into());
        self
    }

    /// Resolve an optional persona key to its instruction.
    ///
    /// Absent, blank, and unknown keys all resolve to the default persona.
    #[must_use]
    pub fn resolve(&self, persona: Option<&str>) -> &str {
        persona
            .map(normalize)
            .filter(|key| !key.is_empty())
            .and_then(|key| self.personas.get(&key))
            .or_else(|| self.personas.get(DEFAULT_PERSONA))
            .map_or(DEFAULT_INSTRUCTION, String::as_str)
    }

    #[must_use]
    pub fn contains(&self, persona: &str) -> bool {
        self.personas.contains_key(&normalize(persona))
    }

    /// Registered keys, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.personas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for PersonaRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn normalize(key: &str) -> String {
    key.trim().to_lowercase()
}
