use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use parley_conversation::ConversationError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Conversation(#[from] ConversationError),
}

impl ApiError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conversation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Failures the operator has to fix locally, such as a missing API key.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Conversation(ConversationError::Provider(e)) if e.is_configuration()
        )
    }
}

/// Errors render as `{"detail": "..."}`.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.to_string();
        if self.is_configuration() {
            error!("Server misconfigured: {detail}");
        } else if status.is_server_error() {
            error!("Request failed: {detail}");
        } else {
            warn!("Rejected request: {detail}");
        }
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::ProviderError;

    #[test]
    fn invalid_request_is_client_error() {
        let err = ApiError::InvalidRequest("No events".to_string());
        assert_eq!(err.to_string(), "No events");
        assert!(!err.is_configuration());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn provider_failures_are_server_errors() {
        let missing_key = ApiError::from(ConversationError::from(ProviderError::MissingApiKey));
        assert_eq!(missing_key.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(missing_key.to_string(), "Missing OPENAI_API_KEY");
        assert!(missing_key.is_configuration());

        let upstream = ApiError::from(ConversationError::from(ProviderError::Upstream {
            status: 429,
            detail: "rate limited".to_string(),
        }));
        assert!(!upstream.is_configuration());
        assert_eq!(
            upstream.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
