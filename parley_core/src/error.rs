use std::time::Duration;

use thiserror::Error;

/// Failures surfaced by a completion provider.
///
/// The `Display` output is what callers ultimately see as the error detail,
/// so upstream bodies are carried verbatim.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Missing OPENAI_API_KEY")]
    MissingApiKey,

    #[error("Upstream provider returned {status}: {detail}")]
    Upstream { status: u16, detail: String },

    #[error("Upstream request failed: {0}")]
    Transport(String),

    #[error("Invalid response format: {0}")]
    MalformedResponse(String),

    #[error("Completion timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

impl ProviderError {
    /// Whether the failure is a local configuration problem rather than an upstream one.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingApiKey)
    }
}
