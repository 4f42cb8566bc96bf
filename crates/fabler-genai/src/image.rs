//! Image generation providers.
//!
//! Two providers implement [`ImageGenerator`]: OpenAI (dall-e-3, fixed square
//! canvas) and Runware (task-array protocol, aspect-ratio-sized canvas).
//! Provider selection happens at request time from the
//! `IMAGE_GENERATION_PROVIDER` runtime flag.

use std::time::Duration;

use async_trait::async_trait;
use fabler_core::models::AspectRatio;
use fabler_core::AppError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

const RUNWARE_MODEL: &str = "runware:100@1";

/// Produces an illustration for a prompt and returns a URL to the result.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, aspect_ratio: AspectRatio)
        -> Result<String, AppError>;
}

#[derive(Debug, Serialize)]
struct OpenAiImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'a str,
}

#[derive(Debug, Deserialize)]
struct OpenAiImageResponse {
    data: Vec<OpenAiImageData>,
}

#[derive(Debug, Deserialize)]
struct OpenAiImageData {
    url: String,
}

/// OpenAI images endpoint client. Always renders on a 1024x1024 canvas; the
/// muxer letterboxes to the requested aspect ratio downstream.
#[derive(Clone)]
pub struct OpenAiImageClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiImageClient {
    pub fn new(base_url: String, api_key: String, model: String) -> Result<Self, AppError> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(OpenAiImageClient {
            http_client,
            base_url,
            api_key,
            model,
        })
    }
}

#[async_trait]
impl ImageGenerator for OpenAiImageClient {
    #[tracing::instrument(skip(self, prompt), fields(provider = "openai"))]
    async fn generate(
        &self,
        prompt: &str,
        _aspect_ratio: AspectRatio,
    ) -> Result<String, AppError> {
        let body = OpenAiImageRequest {
            model: &self.model,
            prompt,
            n: 1,
            size: "1024x1024",
        };

        let response = self
            .http_client
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Generation(format!("Image generation request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Generation(format!(
                "Image generation failed: {} - {}",
                status, error_text
            )));
        }

        let parsed: OpenAiImageResponse = response.json().await.map_err(|e| {
            AppError::Generation(format!("Failed to parse image generation response: {}", e))
        })?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.url)
            .ok_or_else(|| AppError::Generation("Image generation returned no image".to_string()))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunwareTask<'a> {
    task_type: &'a str,
    #[serde(rename = "taskUUID")]
    task_uuid: String,
    positive_prompt: &'a str,
    width: u32,
    height: u32,
    model: &'a str,
    number_results: u32,
}

#[derive(Debug, Deserialize)]
struct RunwareResponse {
    data: Vec<RunwareResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RunwareResult {
    #[serde(rename = "imageURL")]
    image_url: String,
}

/// Runware inference client speaking its task-array protocol.
#[derive(Clone)]
pub struct RunwareImageClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RunwareImageClient {
    pub fn new(base_url: String, api_key: String) -> Result<Self, AppError> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(RunwareImageClient {
            http_client,
            base_url,
            api_key,
        })
    }
}

#[async_trait]
impl ImageGenerator for RunwareImageClient {
    #[tracing::instrument(skip(self, prompt), fields(provider = "runware"))]
    async fn generate(&self, prompt: &str, aspect_ratio: AspectRatio) -> Result<String, AppError> {
        let (width, height) = aspect_ratio.dimensions();
        let tasks = vec![RunwareTask {
            task_type: "imageInference",
            task_uuid: Uuid::new_v4().to_string(),
            positive_prompt: prompt,
            width,
            height,
            model: RUNWARE_MODEL,
            number_results: 1,
        }];

        let response = self
            .http_client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&tasks)
            .send()
            .await
            .map_err(|e| AppError::Generation(format!("Image generation request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Generation(format!(
                "Image generation failed: {} - {}",
                status, error_text
            )));
        }

        let parsed: RunwareResponse = response.json().await.map_err(|e| {
            AppError::Generation(format!("Failed to parse image generation response: {}", e))
        })?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|r| r.image_url)
            .ok_or_else(|| AppError::Generation("Image generation returned no image".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_openai_returns_first_image_url() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/images/generations")
            .with_status(200)
            .with_body(
                json!({"data": [{"url": "https://img.example/1.png"}]}).to_string(),
            )
            .create_async()
            .await;

        let client = OpenAiImageClient::new(
            server.url(),
            "test-key".to_string(),
            "dall-e-3".to_string(),
        )
        .unwrap();
        let url = client
            .generate("a fox in a forest", AspectRatio::Landscape)
            .await
            .unwrap();

        assert_eq!(url, "https://img.example/1.png");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_runware_sizes_canvas_from_aspect_ratio() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(mockito::Matcher::PartialJson(json!([{
                "width": 576,
                "height": 1024,
                "model": "runware:100@1"
            }])))
            .with_status(200)
            .with_body(
                json!({"data": [{"imageURL": "https://img.example/2.png"}]}).to_string(),
            )
            .create_async()
            .await;

        let client =
            RunwareImageClient::new(server.url(), "test-key".to_string()).unwrap();
        let url = client
            .generate("a fox in a forest", AspectRatio::Portrait)
            .await
            .unwrap();

        assert_eq!(url, "https://img.example/2.png");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_result_is_generation_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/images/generations")
            .with_status(200)
            .with_body(json!({"data": []}).to_string())
            .create_async()
            .await;

        let client = OpenAiImageClient::new(
            server.url(),
            "test-key".to_string(),
            "dall-e-3".to_string(),
        )
        .unwrap();
        let err = client
            .generate("a fox", AspectRatio::Landscape)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Generation(_)));
    }
}
