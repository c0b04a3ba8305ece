//! Anthropic Messages API client
//!
//! Sends a single user prompt to `/v1/messages` and returns the text blocks
//! of the answer. The API key is held as a [`SecretString`] and only exposed
//! when building the request headers.

use crate::providers::types::{AnthropicRequest, AnthropicResponse, ChatTurn};
use crate::providers::{
    read_json_response, request_error, GenerationCapability, GenerationError, GenerationParams,
};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

const ANTHROPIC_API_BASE_URL: &str = "https://api.anthropic.com";
const PROVIDER: &str = "Anthropic";

/// Default model used for the Claude picker entry
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-20240620";

/// Claude provider backed by the Anthropic Messages API
pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    base_url: String,
    model: String,
}

impl AnthropicProvider {
    /// The Anthropic API version header value.
    const API_VERSION: &'static str = "2023-06-01";

    /// Create a provider using a shared HTTP client
    pub fn new(client: reqwest::Client, api_key: Option<SecretString>, model: String) -> Self {
        Self {
            client,
            api_key,
            base_url: ANTHROPIC_API_BASE_URL.to_string(),
            model,
        }
    }

    /// Override the base URL (useful for testing or proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl GenerationCapability for AnthropicProvider {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    async fn generate(
        &self,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<Vec<String>, GenerationError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(GenerationError::MissingApiKey(PROVIDER))?;

        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));
        let request_body = AnthropicRequest {
            model: &self.model,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            messages: vec![ChatTurn::user(prompt)],
        };

        tracing::debug!(
            model = %self.model,
            prompt_len = prompt.len(),
            max_tokens = params.max_tokens,
            "Calling Anthropic API"
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key.expose_secret())
            .header("anthropic-version", Self::API_VERSION)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| request_error(PROVIDER, e))?;

        let parsed: AnthropicResponse = read_json_response(PROVIDER, response).await?;

        let parts: Vec<String> = parsed
            .content
            .into_iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text)
            .collect();

        if parts.iter().all(|part| part.is_empty()) {
            return Err(GenerationError::EmptyResponse(PROVIDER));
        }

        tracing::debug!(
            parts = parts.len(),
            stop_reason = ?parsed.stop_reason,
            "Received response from Anthropic API"
        );

        Ok(parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serial_test::serial;

    fn params() -> GenerationParams {
        GenerationParams {
            temperature: 0.7,
            max_tokens: 4000,
        }
    }

    fn provider(base_url: &str) -> AnthropicProvider {
        AnthropicProvider::new(
            reqwest::Client::new(),
            Some(SecretString::from("test-key")),
            DEFAULT_ANTHROPIC_MODEL.to_string(),
        )
        .with_base_url(base_url)
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let provider = AnthropicProvider::new(
            reqwest::Client::new(),
            None,
            DEFAULT_ANTHROPIC_MODEL.to_string(),
        );
        let result = provider.generate("hello", params()).await;
        assert!(matches!(result, Err(GenerationError::MissingApiKey("Anthropic"))));
    }

    #[tokio::test]
    #[serial]
    async fn test_generate_returns_text_blocks() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "test-key")
            .match_header("anthropic-version", "2023-06-01")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": DEFAULT_ANTHROPIC_MODEL,
                "max_tokens": 4000,
                "messages": [{"role": "user", "content": "Hello"}]
            })))
            .with_status(200)
            .with_body(
                r#"{
                    "content": [
                        {"type": "text", "text": "Hi "},
                        {"type": "tool_use", "id": "x"},
                        {"type": "text", "text": "there"}
                    ],
                    "stop_reason": "end_turn"
                }"#,
            )
            .create_async()
            .await;

        let result = provider(&server.url()).generate("Hello", params()).await;

        mock.assert_async().await;
        assert_eq!(result.unwrap(), vec!["Hi ".to_string(), "there".to_string()]);
    }

    #[tokio::test]
    #[serial]
    async fn test_generate_error_status() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .with_status(401)
            .with_body(r#"{"error": {"message": "invalid x-api-key"}}"#)
            .create_async()
            .await;

        let result = provider(&server.url()).generate("Hello", params()).await;

        mock.assert_async().await;
        match result {
            Err(GenerationError::Status { status, body, .. }) => {
                assert_eq!(status, 401);
                assert!(body.contains("invalid x-api-key"));
            }
            other => panic!("Expected Status error, got {:?}", other),
        }
    }

    #[tokio::test]
    #[serial]
    async fn test_generate_rate_limited() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .with_status(429)
            .with_body(r#"{"error": "rate limited"}"#)
            .create_async()
            .await;

        let result = provider(&server.url()).generate("Hello", params()).await;

        mock.assert_async().await;
        let error_msg = result.unwrap_err().to_string();
        assert!(error_msg.contains("rate limit"));
    }

    #[tokio::test]
    #[serial]
    async fn test_generate_empty_content() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .with_status(200)
            .with_body(r#"{"content": []}"#)
            .create_async()
            .await;

        let result = provider(&server.url()).generate("Hello", params()).await;

        mock.assert_async().await;
        assert!(matches!(result, Err(GenerationError::EmptyResponse(_))));
    }
}
