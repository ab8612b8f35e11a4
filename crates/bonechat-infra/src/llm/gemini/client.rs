//! GeminiProvider -- concrete [`LlmProvider`] implementation for Google Gemini.
//!
//! Sends requests to the `generateContent` REST endpoint with the API key
//! in the `x-goog-api-key` header. Prior turns are sent as `contents`
//! followed by the new user prompt; the system instruction and sampling
//! parameters ride along in `systemInstruction` and `generationConfig`.

use std::time::Duration;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};

use bonechat_core::llm::provider::LlmProvider;
use bonechat_types::config::LlmSettings;
use bonechat_types::llm::{
    CompletionRequest, CompletionResponse, ExternalTurn, LlmError, Part, Usage,
};

use super::types::{
    ApiErrorBody, GeminiGenerationConfig, GenerateContentRequest, GenerateContentResponse,
    SystemInstruction,
};

/// Google Gemini LLM provider.
///
/// # API Key Security
///
/// The API key is stored as a [`SecretString`] and is only exposed when
/// constructing HTTP request headers. It never appears in Debug output,
/// Display output, or tracing logs.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

impl GeminiProvider {
    pub const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com";

    /// Create a new Gemini provider.
    ///
    /// `request_timeout` bounds each HTTP call; `None` leaves calls unbounded.
    pub fn new(
        api_key: SecretString,
        model: impl Into<String>,
        request_timeout: Option<Duration>,
    ) -> Result<Self, LlmError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| LlmError::Provider {
            message: format!("failed to create HTTP client: {e}"),
        })?;

        Ok(Self {
            client,
            api_key,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            model: model.into(),
        })
    }

    /// Create a provider from the `[llm]` configuration section.
    pub fn from_settings(settings: &LlmSettings, api_key: SecretString) -> Result<Self, LlmError> {
        let provider = Self::new(
            api_key,
            settings.model.clone(),
            settings.request_timeout_secs.map(Duration::from_secs),
        )?;
        Ok(provider.with_base_url(settings.base_url.clone()))
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    /// Convert a generic [`CompletionRequest`] into a [`GenerateContentRequest`].
    fn to_gemini_request(request: &CompletionRequest) -> GenerateContentRequest {
        let mut contents = request.history.clone();
        contents.push(ExternalTurn::text("user", request.prompt.clone()));

        let system_instruction = request
            .system_instruction
            .as_ref()
            .filter(|text| !text.trim().is_empty())
            .map(|text| SystemInstruction {
                parts: vec![Part { text: text.clone() }],
            });

        GenerateContentRequest {
            contents,
            system_instruction,
            generation_config: GeminiGenerationConfig {
                max_output_tokens: request.config.max_output_tokens,
                temperature: request.config.temperature,
            },
        }
    }
}

/// Map a non-success HTTP status and body to an [`LlmError`].
///
/// Gemini error bodies carry a human-readable `error.message`; that is
/// preferred over the raw body when present.
fn map_error_status(status: StatusCode, body: &str) -> LlmError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .map(|b| b.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.to_string());

    match status.as_u16() {
        400 => LlmError::InvalidRequest(message),
        401 | 403 => LlmError::AuthenticationFailed(message),
        429 => LlmError::RateLimited(message),
        _ => LlmError::Provider {
            message: format!("HTTP {status}: {message}"),
        },
    }
}

// GeminiProvider intentionally does NOT derive Debug so the HTTP client and
// key never end up in logs by accident.

impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = Self::to_gemini_request(request);

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(map_error_status(status, &error_body));
        }

        let gemini_resp: GenerateContentResponse = response.json().await.map_err(|e| {
            LlmError::Deserialization(format!("failed to parse response: {e}"))
        })?;

        if let Some(reason) = gemini_resp.block_reason() {
            return Err(LlmError::Blocked(reason.to_string()));
        }

        let usage = gemini_resp
            .usage_metadata
            .as_ref()
            .map(|u| Usage {
                input_tokens: u.prompt_token_count.unwrap_or(0),
                output_tokens: u.candidates_token_count.unwrap_or(0),
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            text: gemini_resp.text(),
            model: gemini_resp
                .model_version
                .clone()
                .unwrap_or_else(|| self.model.clone()),
            finish_reason: gemini_resp.finish_reason(),
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::Json;
    use axum::http::HeaderMap;
    use axum::routing::post;
    use bonechat_types::llm::GenerationConfig;
    use serde_json::{Value, json};

    const MODEL: &str = "gemini-test";

    type Captured = Arc<Mutex<Vec<(Option<String>, Value)>>>;

    /// Serve a canned response on the generateContent path of a local port.
    async fn spawn_server(status: StatusCode, reply: Value) -> (String, Captured) {
        let captured: Captured = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&captured);

        let app = axum::Router::new().route(
            &format!("/v1beta/models/{MODEL}:generateContent"),
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let sink = Arc::clone(&sink);
                let reply = reply.clone();
                async move {
                    let key = headers
                        .get("x-goog-api-key")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    sink.lock().unwrap().push((key, body));
                    (status, Json(reply))
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}"), captured)
    }

    fn make_provider(base_url: &str) -> GeminiProvider {
        GeminiProvider::new(SecretString::from("test-key-not-real"), MODEL, None)
            .unwrap()
            .with_base_url(base_url)
    }

    fn make_request() -> CompletionRequest {
        CompletionRequest {
            history: vec![
                ExternalTurn::text("user", "What is Rust?"),
                ExternalTurn::text("model", "A systems language."),
            ],
            prompt: "Is it fast?".to_string(),
            system_instruction: Some("You are a helpful assistant.".to_string()),
            config: GenerationConfig::default(),
        }
    }

    #[test]
    fn test_provider_name_and_url() {
        let provider = make_provider("https://example.com/");
        assert_eq!(provider.name(), "gemini");
        assert_eq!(provider.model(), MODEL);
        assert_eq!(
            provider.url(),
            "https://example.com/v1beta/models/gemini-test:generateContent"
        );
    }

    #[test]
    fn test_from_settings_uses_configured_base_url() {
        let settings = LlmSettings {
            base_url: "http://localhost:9999".to_string(),
            ..LlmSettings::default()
        };
        let provider =
            GeminiProvider::from_settings(&settings, SecretString::from("k")).unwrap();
        assert_eq!(provider.model(), "gemini-2.0-flash");
        assert!(provider.url().starts_with("http://localhost:9999/v1beta/models/gemini-2.0-flash"));
    }

    #[test]
    fn test_request_appends_prompt_after_history() {
        let request = GeminiProvider::to_gemini_request(&make_request());
        assert_eq!(request.contents.len(), 3);
        assert_eq!(request.contents[2], ExternalTurn::text("user", "Is it fast?"));
        assert!(request.system_instruction.is_some());
        assert_eq!(request.generation_config.max_output_tokens, 512);
    }

    #[test]
    fn test_blank_system_instruction_is_omitted() {
        let mut request = make_request();
        request.system_instruction = Some("   ".to_string());
        assert!(GeminiProvider::to_gemini_request(&request).system_instruction.is_none());
    }

    #[test]
    fn test_status_mapping() {
        let body = r#"{"error": {"code": 429, "message": "quota exceeded", "status": "RESOURCE_EXHAUSTED"}}"#;
        match map_error_status(StatusCode::TOO_MANY_REQUESTS, body) {
            LlmError::RateLimited(msg) => assert_eq!(msg, "quota exceeded"),
            other => panic!("expected RateLimited, got {other}"),
        }
        assert!(matches!(
            map_error_status(StatusCode::BAD_REQUEST, "bad"),
            LlmError::InvalidRequest(_)
        ));
        assert!(matches!(
            map_error_status(StatusCode::FORBIDDEN, ""),
            LlmError::AuthenticationFailed(_)
        ));
        match map_error_status(StatusCode::SERVICE_UNAVAILABLE, "overloaded") {
            LlmError::Provider { message } => {
                assert!(message.contains("503"));
                assert!(message.contains("overloaded"));
            }
            other => panic!("expected Provider, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_complete_success() {
        let (base_url, captured) = spawn_server(
            StatusCode::OK,
            json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "Very fast."}]},
                    "finishReason": "STOP"
                }],
                "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 3},
                "modelVersion": "gemini-test-001"
            }),
        )
        .await;

        let response = make_provider(&base_url).complete(&make_request()).await.unwrap();

        assert_eq!(response.text.as_deref(), Some("Very fast."));
        assert_eq!(response.model, "gemini-test-001");
        assert_eq!(response.finish_reason.as_deref(), Some("STOP"));
        assert_eq!(response.usage.input_tokens, 12);
        assert_eq!(response.usage.output_tokens, 3);

        let captured = captured.lock().unwrap();
        assert_eq!(captured.len(), 1);
        let (key, body) = &captured[0];
        assert_eq!(key.as_deref(), Some("test-key-not-real"));
        assert_eq!(body["contents"].as_array().unwrap().len(), 3);
        assert_eq!(body["contents"][2]["parts"][0]["text"], "Is it fast?");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 512);
        assert_eq!(
            body["systemInstruction"]["parts"][0]["text"],
            "You are a helpful assistant."
        );
    }

    #[tokio::test]
    async fn test_complete_empty_candidates_yields_no_text() {
        let (base_url, _) = spawn_server(StatusCode::OK, json!({"candidates": []})).await;
        let response = make_provider(&base_url).complete(&make_request()).await.unwrap();
        assert!(response.text.is_none());
        assert_eq!(response.model, MODEL);
    }

    #[tokio::test]
    async fn test_complete_blocked_prompt() {
        let (base_url, _) = spawn_server(
            StatusCode::OK,
            json!({"promptFeedback": {"blockReason": "SAFETY"}}),
        )
        .await;
        let err = make_provider(&base_url)
            .complete(&make_request())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Blocked(ref reason) if reason == "SAFETY"));
    }

    #[tokio::test]
    async fn test_complete_quota_error() {
        let (base_url, _) = spawn_server(
            StatusCode::TOO_MANY_REQUESTS,
            json!({"error": {"code": 429, "message": "quota exceeded", "status": "RESOURCE_EXHAUSTED"}}),
        )
        .await;
        let err = make_provider(&base_url)
            .complete(&make_request())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_complete_connection_refused() {
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = make_provider(&format!("http://{addr}"))
            .complete(&make_request())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Provider { .. }));
    }
}
