use std::time::Duration;

use async_trait::async_trait;
use parley_core::{ChatMessage, CompletionOptions, LLMProvider, LLMResponse, ProviderError, Usage};
use reqwest::Client;
use serde_json::json;
use tracing::{debug, info};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-5";

/// Chat-completions client for OpenAI-compatible endpoints.
///
/// The API key is optional at construction so the server can start without
/// one; every call then fails with [`ProviderError::MissingApiKey`].
#[derive(Clone)]
pub struct OpenAIProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    default_model: String,
    reasoning_model_prefixes: Vec<String>,
    request_timeout: Option<Duration>,
}

impl OpenAIProvider {
    pub fn new(api_key: Option<String>) -> Self {
        info!("Creating OpenAIProvider");
        Self {
            client: Client::new(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            reasoning_model_prefixes: vec![DEFAULT_MODEL.to_string()],
            request_timeout: None,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_default_model(mut self, model: String) -> Self {
        self.default_model = model;
        self
    }

    /// Models whose name starts with one of these prefixes never receive a
    /// `temperature` parameter.
    #[must_use]
    pub fn with_reasoning_model_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.reasoning_model_prefixes = prefixes;
        self
    }

    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    fn resolve_model<'a>(&'a self, options: &'a CompletionOptions) -> &'a str {
        options
            .model
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(&self.default_model)
    }

    fn accepts_temperature(&self, model: &str) -> bool {
        !self
            .reasoning_model_prefixes
            .iter()
            .any(|prefix| model.starts_with(prefix.as_str()))
    }

    /// Build the request body. A temperature of exactly 1 is the provider
    /// default and is left out.
    fn build_request(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> serde_json::Value {
        let model = self.resolve_model(options);
        let mut request = json!({
            "model": model,
            "messages": messages,
        });

        let temperature = options
            .temperature
            .filter(|t| self.accepts_temperature(model) && (t - 1.0).abs() > f32::EPSILON);
        if let Some(temperature) = temperature {
            request["temperature"] = json!(temperature);
        }

        request
    }

    fn transport_error(&self, err: &reqwest::Error) -> ProviderError {
        match self.request_timeout {
            Some(timeout) if err.is_timeout() => ProviderError::Timeout(timeout),
            _ => ProviderError::Transport(err.to_string()),
        }
    }

    async fn try_send(
        &self,
        api_key: &str,
        request: &serde_json::Value,
    ) -> Result<LLMResponse, ProviderError> {
        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(request);
        if let Some(timeout) = self.request_timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {e}>"));
            return Err(ProviderError::Upstream {
                status: status.as_u16(),
                detail,
            });
        }

        let body = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        parse_completion(&body)
    }
}

fn parse_completion(body: &serde_json::Value) -> Result<LLMResponse, ProviderError> {
    let content = body["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| ProviderError::MalformedResponse("missing content".to_string()))?
        .to_string();

    // Upstreams may send a partial usage object; absent counts are zero.
    let usage = body["usage"].as_object().map(|u| {
        let count = |key: &str| {
            u.get(key)
                .and_then(serde_json::Value::as_u64)
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0)
        };
        Usage {
            prompt_tokens: count("prompt_tokens"),
            completion_tokens: count("completion_tokens"),
            total_tokens: count("total_tokens"),
        }
    });

    Ok(LLMResponse { content, usage })
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<LLMResponse, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::MissingApiKey)?;
        let request = self.build_request(messages, options);

        info!(
            "Sending request to chat completions: model={}, messages={}",
            request["model"].as_str().unwrap_or_default(),
            messages.len()
        );

        let response = self.try_send(api_key, &request).await?;

        if let Some(usage) = &response.usage {
            debug!(
                "Tokens: {} prompt + {} completion = {} total",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }
        info!("Received chat completion");
        Ok(response)
    }

    fn get_default_model(&self) -> &str {
        &self.default_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::StatusCode, routing::post};

    fn messages() -> Vec<ChatMessage> {
        vec![ChatMessage::system("be brief"), ChatMessage::user("hi")]
    }

    async fn spawn_upstream(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap_or_else(|e| panic!("bind failed: {e}"));
        let addr = listener
            .local_addr()
            .unwrap_or_else(|e| panic!("no local addr: {e}"));
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        format!("http://{addr}/v1")
    }

    #[test]
    fn default_model_applies_without_override() {
        let provider = OpenAIProvider::new(Some("k".into()));
        let request = provider.build_request(&messages(), &CompletionOptions::default());
        assert_eq!(request["model"], "gpt-5");
        assert_eq!(request["messages"][1]["role"], "user");
        assert!(request.get("temperature").is_none());
    }

    #[test]
    fn temperature_ignored_for_reasoning_models() {
        let provider = OpenAIProvider::new(Some("k".into()));
        let options = CompletionOptions::new(Some("gpt-5-mini".into()), Some(0.2));
        let request = provider.build_request(&messages(), &options);
        assert_eq!(request["model"], "gpt-5-mini");
        assert!(request.get("temperature").is_none());
    }

    #[test]
    fn temperature_sent_for_other_models_unless_default() {
        let provider = OpenAIProvider::new(Some("k".into()));

        let options = CompletionOptions::new(Some("gpt-4o".into()), Some(0.5));
        let request = provider.build_request(&messages(), &options);
        assert_eq!(request["temperature"], json!(0.5_f32));

        let options = CompletionOptions::new(Some("gpt-4o".into()), Some(1.0));
        let request = provider.build_request(&messages(), &options);
        assert!(request.get("temperature").is_none());
    }

    #[test]
    fn configured_prefixes_replace_default_family() {
        let provider = OpenAIProvider::new(Some("k".into()))
            .with_reasoning_model_prefixes(vec!["o3".into()]);
        let request = provider.build_request(
            &messages(),
            &CompletionOptions::new(Some("o3-mini".into()), Some(0.3)),
        );
        assert!(request.get("temperature").is_none());

        let request = provider.build_request(
            &messages(),
            &CompletionOptions::new(Some("gpt-5".into()), Some(0.3)),
        );
        assert!(request.get("temperature").is_some());
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_io() {
        let provider = OpenAIProvider::new(Some("   ".into()))
            .with_base_url("http://127.0.0.1:9".into());
        let err = provider
            .chat(&messages(), &CompletionOptions::default())
            .await
            .err();
        assert!(matches!(err, Some(ProviderError::MissingApiKey)));
    }

    #[tokio::test]
    async fn parses_successful_completion() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|Json(body): Json<serde_json::Value>| async move {
                let echoed = body["messages"][1]["content"].as_str().unwrap_or("").to_string();
                Json(json!({
                    "choices": [{"message": {"role": "assistant", "content": format!("echo: {echoed}")}}],
                    "usage": {"prompt_tokens": 5, "completion_tokens": 2, "total_tokens": 7}
                }))
            }),
        );
        let base_url = spawn_upstream(router).await;
        let provider = OpenAIProvider::new(Some("k".into())).with_base_url(base_url);

        let response = provider
            .chat(&messages(), &CompletionOptions::default())
            .await
            .unwrap_or_else(|e| panic!("completion failed: {e}"));
        assert_eq!(response.content, "echo: hi");
        assert_eq!(response.usage.map(|u| u.total_tokens), Some(7));
    }

    #[test]
    fn partial_usage_counts_default_to_zero() {
        let response = parse_completion(&json!({
            "choices": [{"message": {"content": "hi"}}],
            "usage": {"prompt_tokens": 5, "completion_tokens": 2}
        }))
        .unwrap_or_else(|e| panic!("parse failed: {e}"));

        assert_eq!(response.content, "hi");
        let usage = response.usage.unwrap_or_else(|| panic!("usage dropped"));
        assert_eq!(usage.prompt_tokens, 5);
        assert_eq!(usage.completion_tokens, 2);
        assert_eq!(usage.total_tokens, 0);
    }

    #[test]
    fn non_numeric_usage_is_tolerated() {
        let response = parse_completion(&json!({
            "choices": [{"message": {"content": "hi"}}],
            "usage": {"total_tokens": "many"}
        }))
        .unwrap_or_else(|e| panic!("parse failed: {e}"));
        assert_eq!(response.usage.map(|u| u.total_tokens), Some(0));
    }

    #[tokio::test]
    async fn upstream_status_and_body_are_surfaced() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { (StatusCode::UNAUTHORIZED, "bad key") }),
        );
        let base_url = spawn_upstream(router).await;
        let provider = OpenAIProvider::new(Some("k".into())).with_base_url(base_url);

        match provider.chat(&messages(), &CompletionOptions::default()).await {
            Err(ProviderError::Upstream { status, detail }) => {
                assert_eq!(status, 401);
                assert_eq!(detail, "bad key");
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_content_is_malformed() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(json!({"choices": []})) }),
        );
        let base_url = spawn_upstream(router).await;
        let provider = OpenAIProvider::new(Some("k".into())).with_base_url(base_url);

        let err = provider
            .chat(&messages(), &CompletionOptions::default())
            .await
            .err();
        assert!(matches!(err, Some(ProviderError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn slow_upstream_hits_request_timeout() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({}))
            }),
        );
        let base_url = spawn_upstream(router).await;
        let provider = OpenAIProvider::new(Some("k".into()))
            .with_base_url(base_url)
            .with_request_timeout(Some(Duration::from_millis(100)));

        let err = provider
            .chat(&messages(), &CompletionOptions::default())
            .await
            .err();
        assert!(matches!(err, Some(ProviderError::Timeout(_))));
    }
}
