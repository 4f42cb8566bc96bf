//! Downloading provider-hosted media into memory for re-upload.

use std::time::Duration;

use async_trait::async_trait;
use fabler_core::AppError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Fetches media bytes from a URL. Provider result URLs are short-lived, so
/// the pipeline downloads and re-hosts them immediately.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    async fn download(&self, url: &str) -> Result<Vec<u8>, AppError>;
}

#[derive(Clone)]
pub struct HttpMediaFetcher {
    http_client: reqwest::Client,
}

impl HttpMediaFetcher {
    pub fn new() -> Result<Self, AppError> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(HttpMediaFetcher { http_client })
    }
}

#[async_trait]
impl MediaFetcher for HttpMediaFetcher {
    #[tracing::instrument(skip(self))]
    async fn download(&self, url: &str) -> Result<Vec<u8>, AppError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::Download(format!("Failed to fetch {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Download(format!(
                "Fetching {} returned {}",
                url, status
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::Download(format!("Failed to read body of {}: {}", url, e)))?;

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_download_returns_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/image.png")
            .with_status(200)
            .with_body(b"image-bytes".to_vec())
            .create_async()
            .await;

        let fetcher = HttpMediaFetcher::new().unwrap();
        let bytes = fetcher
            .download(&format!("{}/image.png", server.url()))
            .await
            .unwrap();

        assert_eq!(bytes, b"image-bytes");
    }

    #[tokio::test]
    async fn test_missing_resource_is_download_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/gone.png")
            .with_status(404)
            .create_async()
            .await;

        let fetcher = HttpMediaFetcher::new().unwrap();
        let err = fetcher
            .download(&format!("{}/gone.png", server.url()))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Download(_)));
    }
}
