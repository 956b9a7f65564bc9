use crate::llm::client::LLMClient;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Build an HTTP client carrying the bearer token and JSON content type.
///
/// `beta` adds the `OpenAI-Beta: assistants=v2` header required by the
/// threads/runs endpoints.
pub(crate) fn http_client(api_key: &str, beta: bool, timeout: Duration) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|e| AppError::Configuration(format!("Invalid API key: {}", e)))?,
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if beta {
        headers.insert("OpenAI-Beta", HeaderValue::from_static("assistants=v2"));
    }

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()
        .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))
}

/// Chat-completions client for OpenAI and compatible endpoints.
pub struct OpenAIClient {
    client: reqwest::Client,
    api_base: String,
    model: String,
}

impl OpenAIClient {
    pub fn new(api_key: &str, api_base: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: http_client(api_key, false, Duration::from_secs(120))?,
            api_base: api_base.into(),
            model: model.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl LLMClient for OpenAIClient {
    async fn complete(&self, system: &str, prompt: &str, model: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": prompt},
            ]
        });
        debug!(model, "chat completion request");

        let response = self
            .client
            .post(self.endpoint())
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::LLM(format!("OpenAI API error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::LLM(format!("OpenAI API error ({}): {}", status, text)));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::LLM(format!("Failed to parse response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::LLM("No response from OpenAI".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_complete_sends_system_and_user() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "messages": [
                    {"role": "system", "content": "sys"},
                    {"role": "user", "content": "hi"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "hello"}}]
            })))
            .mount(&server)
            .await;

        let client = OpenAIClient::new("sk-test", server.uri(), "gpt-3.5-turbo").unwrap();
        let answer = client.complete("sys", "hi", "gpt-4o-mini").await.unwrap();
        assert_eq!(answer, "hello");
    }

    #[tokio::test]
    async fn test_complete_surfaces_http_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let client = OpenAIClient::new("sk-test", server.uri(), "gpt-3.5-turbo").unwrap();
        let err = client.generate("hi").await.unwrap_err();
        assert!(matches!(err, AppError::LLM(_)));
        assert!(err.to_string().contains("429"));
    }

    #[tokio::test]
    async fn test_empty_choices_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let client = OpenAIClient::new("sk-test", server.uri(), "gpt-3.5-turbo").unwrap();
        assert!(client.generate("hi").await.is_err());
    }
}
