//! Text-to-speech client for story narration.

use std::time::Duration;

use fabler_core::AppError;
use serde::Serialize;

// Narrating a full story can take a while on the provider side.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(180);

const DEFAULT_MODEL: &str = "eleven_multilingual_v2";

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

/// ElevenLabs text-to-speech client. Returns raw mp3 bytes.
#[derive(Clone)]
pub struct SpeechClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SpeechClient {
    pub fn new(base_url: String, api_key: String) -> Result<Self, AppError> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(SpeechClient {
            http_client,
            base_url,
            api_key,
        })
    }

    /// Synthesize narration for `text` with the given voice.
    #[tracing::instrument(skip(self, text), fields(voice_id = voice_id, text_len = text.len()))]
    pub async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Vec<u8>, AppError> {
        let body = SpeechRequest {
            text,
            model_id: DEFAULT_MODEL,
        };

        let response = self
            .http_client
            .post(format!("{}/text-to-speech/{}", self.base_url, voice_id))
            .header("xi-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Generation(format!("Speech synthesis request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Generation(format!(
                "Speech synthesis failed: {} - {}",
                status, error_text
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::Generation(format!("Failed to read synthesized audio: {}", e)))?;

        if bytes.is_empty() {
            return Err(AppError::Generation(
                "Speech synthesis returned no audio".to_string(),
            ));
        }

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_synthesize_returns_audio_bytes() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/text-to-speech/voice-123")
            .match_header("xi-api-key", "test-key")
            .with_status(200)
            .with_body(vec![0x49, 0x44, 0x33, 0x04])
            .create_async()
            .await;

        let client = SpeechClient::new(server.url(), "test-key".to_string()).unwrap();
        let audio = client.synthesize("Once upon a time", "voice-123").await.unwrap();

        assert_eq!(audio, vec![0x49, 0x44, 0x33, 0x04]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_audio_is_generation_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/text-to-speech/voice-123")
            .with_status(200)
            .with_body(Vec::<u8>::new())
            .create_async()
            .await;

        let client = SpeechClient::new(server.url(), "test-key".to_string()).unwrap();
        let err = client
            .synthesize("Once upon a time", "voice-123")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Generation(_)));
    }
}
