//! Client for the native video muxing service.
//!
//! The muxer combines a still image and a narration track into an mp4. It
//! reads its inputs from the shared video bucket and writes the finished
//! video back under the requested output key.

use std::time::Duration;

use async_trait::async_trait;
use fabler_core::models::{AspectRatio, ProcessingMethod};
use fabler_core::AppError;
use serde::{Deserialize, Serialize};

// Muxing a long story can dominate the whole pipeline's latency.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// A muxing job: where to read the inputs, where to write the output.
#[derive(Debug, Clone, Serialize)]
pub struct MuxRequest {
    pub image_url: String,
    pub audio_url: String,
    pub output_key: String,
    pub aspect_ratio: AspectRatio,
}

/// What the muxer reports back on success.
#[derive(Debug, Clone, Deserialize)]
pub struct MuxOutcome {
    #[serde(default)]
    pub processing_method: Option<ProcessingMethod>,
}

/// The muxer as the pipeline sees it; mocked in orchestrator tests.
#[async_trait]
pub trait MuxService: Send + Sync {
    async fn mux(&self, request: &MuxRequest) -> Result<MuxOutcome, AppError>;
}

#[derive(Debug, Deserialize)]
struct MuxResponseBody {
    success: bool,
    #[serde(default)]
    processing_method: Option<ProcessingMethod>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Clone)]
pub struct HttpMuxService {
    http_client: reqwest::Client,
    service_url: String,
}

impl HttpMuxService {
    pub fn new(service_url: String) -> Result<Self, AppError> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(HttpMuxService {
            http_client,
            service_url,
        })
    }
}

#[async_trait]
impl MuxService for HttpMuxService {
    #[tracing::instrument(skip(self, request), fields(output_key = %request.output_key))]
    async fn mux(&self, request: &MuxRequest) -> Result<MuxOutcome, AppError> {
        let response = self
            .http_client
            .post(&self.service_url)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::Muxing(format!("Mux service request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Muxing(format!(
                "Mux service failed: {} - {}",
                status, error_text
            )));
        }

        let body: MuxResponseBody = response
            .json()
            .await
            .map_err(|e| AppError::Muxing(format!("Failed to parse mux service response: {}", e)))?;

        if !body.success {
            return Err(AppError::Muxing(
                body.error
                    .unwrap_or_else(|| "Mux service reported failure".to_string()),
            ));
        }

        Ok(MuxOutcome {
            processing_method: body.processing_method,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> MuxRequest {
        MuxRequest {
            image_url: "https://media.example/story-videos/temp_a.png".to_string(),
            audio_url: "https://media.example/story-videos/temp_b.mp3".to_string(),
            output_key: "out.mp4".to_string(),
            aspect_ratio: AspectRatio::Landscape,
        }
    }

    #[tokio::test]
    async fn test_successful_mux_reports_method() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(json!({"success": true, "processing_method": "ffmpeg"}).to_string())
            .create_async()
            .await;

        let service = HttpMuxService::new(server.url()).unwrap();
        let outcome = service.mux(&request()).await.unwrap();

        assert_eq!(outcome.processing_method, Some(ProcessingMethod::Ffmpeg));
    }

    #[tokio::test]
    async fn test_reported_failure_is_muxing_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(json!({"success": false, "error": "ffmpeg exited 1"}).to_string())
            .create_async()
            .await;

        let service = HttpMuxService::new(server.url()).unwrap();
        let err = service.mux(&request()).await.unwrap_err();

        match err {
            AppError::Muxing(message) => assert!(message.contains("ffmpeg exited 1")),
            other => panic!("expected Muxing error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_http_error_is_muxing_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(500)
            .create_async()
            .await;

        let service = HttpMuxService::new(server.url()).unwrap();
        let err = service.mux(&request()).await.unwrap_err();
        assert!(matches!(err, AppError::Muxing(_)));
    }
}
