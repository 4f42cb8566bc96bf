//! OpenAI chat completions client, used for story generation and translation.

use std::time::Duration;

use fabler_core::AppError;
use serde::{Deserialize, Serialize};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// One message in a chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Sampling knobs for a completion. Defaults match plain deterministic-ish
/// translation; story generation raises temperature and the penalties.
#[derive(Debug, Clone)]
pub struct ChatOptions {
    pub temperature: f32,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
    pub max_tokens: Option<u32>,
}

impl Default for ChatOptions {
    fn default() -> Self {
        ChatOptions {
            temperature: 0.7,
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
            max_tokens: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    presence_penalty: f32,
    frequency_penalty: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: String,
}

/// Client for the chat completions endpoint.
#[derive(Clone)]
pub struct ChatClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ChatClient {
    pub fn new(base_url: String, api_key: String) -> Result<Self, AppError> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(ChatClient {
            http_client,
            base_url,
            api_key,
        })
    }

    /// Run a completion and return the first choice's content.
    #[tracing::instrument(skip(self, messages, options), fields(model = model))]
    pub async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<String, AppError> {
        let body = CompletionRequest {
            model,
            messages,
            temperature: options.temperature,
            presence_penalty: options.presence_penalty,
            frequency_penalty: options.frequency_penalty,
            max_tokens: options.max_tokens,
        };

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Generation(format!("Chat completion request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Generation(format!(
                "Chat completion failed: {} - {}",
                status, error_text
            )));
        }

        let parsed: CompletionResponse = response.json().await.map_err(|e| {
            AppError::Generation(format!("Failed to parse chat completion response: {}", e))
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(AppError::Generation(
                "Chat completion returned no content".to_string(),
            ));
        }

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_body(
                json!({
                    "choices": [
                        {"message": {"role": "assistant", "content": "Once upon a time..."}}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = ChatClient::new(server.url(), "test-key".to_string()).unwrap();
        let content = client
            .complete(
                "gpt-4o-mini",
                &[ChatMessage::user("Tell me a story")],
                &ChatOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(content, "Once upon a time...");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_upstream_error_maps_to_generation() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body(r#"{"error": {"message": "rate limited"}}"#)
            .create_async()
            .await;

        let client = ChatClient::new(server.url(), "test-key".to_string()).unwrap();
        let err = client
            .complete("gpt-4o-mini", &[ChatMessage::user("hi")], &ChatOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Generation(_)));
    }

    #[tokio::test]
    async fn test_empty_content_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(json!({"choices": []}).to_string())
            .create_async()
            .await;

        let client = ChatClient::new(server.url(), "test-key".to_string()).unwrap();
        let err = client
            .complete("gpt-4o-mini", &[ChatMessage::user("hi")], &ChatOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Generation(_)));
    }
}
