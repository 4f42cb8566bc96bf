//! Video orchestration: illustration, narration, and muxing into one mp4.
//!
//! The flow generates a background image for the story, downloads it together
//! with the narration audio, stages both as temporary objects in the video
//! bucket, asks the muxing service to combine them, and hands back the public
//! URL of the finished video. Temporary objects are deleted afterwards
//! whether or not muxing succeeded.

use std::sync::Arc;

use fabler_core::models::{AspectRatio, ProcessingMethod};
use fabler_core::AppError;
use fabler_genai::{ImageGenerator, MediaFetcher, MuxRequest, MuxService};
use fabler_storage::{keys, Storage, STORY_VIDEOS_BUCKET};

use crate::prompt;

/// What a completed video run produced.
#[derive(Debug, Clone)]
pub struct VideoArtifacts {
    pub video_url: String,
    pub processing_method: Option<ProcessingMethod>,
}

/// Drives the image -> stage -> mux -> cleanup flow.
pub struct VideoOrchestrator {
    storage: Arc<dyn Storage>,
    image_generator: Arc<dyn ImageGenerator>,
    fetcher: Arc<dyn MediaFetcher>,
    mux_service: Arc<dyn MuxService>,
}

impl VideoOrchestrator {
    pub fn new(
        storage: Arc<dyn Storage>,
        image_generator: Arc<dyn ImageGenerator>,
        fetcher: Arc<dyn MediaFetcher>,
        mux_service: Arc<dyn MuxService>,
    ) -> Self {
        Self {
            storage,
            image_generator,
            fetcher,
            mux_service,
        }
    }

    /// Produce a video for a story.
    ///
    /// `image_prompt` is the story's stored illustration prompt, if any;
    /// `content` is the story text used as a fallback scene description.
    /// `audio_url` must point at an already-generated narration track.
    #[tracing::instrument(skip(self, image_prompt, content, audio_url))]
    pub async fn generate(
        &self,
        image_prompt: Option<&str>,
        content: &str,
        audio_url: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<VideoArtifacts, AppError> {
        let scene = prompt::illustration_scene(image_prompt, content);
        let enhanced_prompt = prompt::enhance_illustration_prompt(&scene);

        tracing::info!("Generating background image");
        let background_url = self
            .image_generator
            .generate(&enhanced_prompt, aspect_ratio)
            .await?;

        tracing::info!("Downloading background image and narration audio");
        let (image_bytes, audio_bytes) = tokio::try_join!(
            self.fetcher.download(&background_url),
            self.fetcher.download(audio_url),
        )?;

        let image_key = keys::temp_object_key("png");
        let audio_key = keys::temp_object_key("mp3");
        let output_key = keys::video_output_key();

        tracing::info!("Staging temporary objects");
        let staged_image_url = self
            .storage
            .upload(STORY_VIDEOS_BUCKET, &image_key, image_bytes, "image/png")
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;
        let staged_audio_url = match self
            .storage
            .upload(STORY_VIDEOS_BUCKET, &audio_key, audio_bytes, "audio/mpeg")
            .await
        {
            Ok(url) => url,
            Err(e) => {
                self.cleanup(&image_key, &audio_key).await;
                return Err(AppError::Storage(e.to_string()));
            }
        };

        let request = MuxRequest {
            image_url: staged_image_url,
            audio_url: staged_audio_url,
            output_key: output_key.clone(),
            aspect_ratio,
        };

        tracing::info!(output_key = %output_key, "Muxing video");
        let mux_result = self.mux_service.mux(&request).await;

        // Temporaries go away regardless of how muxing went.
        self.cleanup(&image_key, &audio_key).await;

        let outcome = mux_result?;
        let video_url = self.storage.public_url(STORY_VIDEOS_BUCKET, &output_key);

        tracing::info!(video_url = %video_url, "Video generation completed");
        Ok(VideoArtifacts {
            video_url,
            processing_method: outcome.processing_method,
        })
    }

    /// Best-effort deletion of both staged objects, in parallel. Failures are
    /// logged and swallowed; a leaked `temp_` object must not fail the run.
    async fn cleanup(&self, image_key: &str, audio_key: &str) {
        let (image_result, audio_result) = tokio::join!(
            self.storage.delete(STORY_VIDEOS_BUCKET, image_key),
            self.storage.delete(STORY_VIDEOS_BUCKET, audio_key),
        );
        for (key, result) in [(image_key, image_result), (audio_key, audio_result)] {
            if let Err(e) = result {
                tracing::warn!(key = %key, error = %e, "Failed to delete temporary object");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use fabler_storage::{StorageError, StorageResult};
    use fabler_genai::MuxOutcome;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory storage tracking uploads and deletions.
    #[derive(Default)]
    struct MemoryStorage {
        objects: Mutex<HashMap<String, Vec<u8>>>,
        deleted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Storage for MemoryStorage {
        async fn upload(
            &self,
            bucket: &str,
            key: &str,
            data: Vec<u8>,
            _content_type: &str,
        ) -> StorageResult<String> {
            let full = format!("{}/{}", bucket, key);
            self.objects.lock().unwrap().insert(full.clone(), data);
            Ok(format!("mem://{}", full))
        }

        async fn download(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>> {
            let full = format!("{}/{}", bucket, key);
            self.objects
                .lock()
                .unwrap()
                .get(&full)
                .cloned()
                .ok_or(StorageError::NotFound(full))
        }

        async fn delete(&self, bucket: &str, key: &str) -> StorageResult<()> {
            let full = format!("{}/{}", bucket, key);
            self.deleted.lock().unwrap().push(full.clone());
            self.objects
                .lock()
                .unwrap()
                .remove(&full)
                .map(|_| ())
                .ok_or(StorageError::NotFound(full))
        }

        fn public_url(&self, bucket: &str, key: &str) -> String {
            format!("mem://{}/{}", bucket, key)
        }

        async fn exists(&self, bucket: &str, key: &str) -> StorageResult<bool> {
            let full = format!("{}/{}", bucket, key);
            Ok(self.objects.lock().unwrap().contains_key(&full))
        }
    }

    struct FixedImageGenerator;

    #[async_trait]
    impl ImageGenerator for FixedImageGenerator {
        async fn generate(
            &self,
            prompt: &str,
            _aspect_ratio: AspectRatio,
        ) -> Result<String, AppError> {
            assert!(prompt.contains("storybook"));
            Ok("https://img.example/background.png".to_string())
        }
    }

    struct FixedFetcher;

    #[async_trait]
    impl MediaFetcher for FixedFetcher {
        async fn download(&self, url: &str) -> Result<Vec<u8>, AppError> {
            if url.ends_with(".png") {
                Ok(b"image".to_vec())
            } else {
                Ok(b"audio".to_vec())
            }
        }
    }

    struct StubMux {
        fail: bool,
    }

    #[async_trait]
    impl MuxService for StubMux {
        async fn mux(&self, request: &MuxRequest) -> Result<MuxOutcome, AppError> {
            assert!(request.image_url.starts_with("mem://story-videos/temp_"));
            assert!(request.audio_url.starts_with("mem://story-videos/temp_"));
            if self.fail {
                Err(AppError::Muxing("ffmpeg exited 1".to_string()))
            } else {
                Ok(MuxOutcome {
                    processing_method: Some(ProcessingMethod::Ffmpeg),
                })
            }
        }
    }

    fn orchestrator(storage: Arc<MemoryStorage>, fail_mux: bool) -> VideoOrchestrator {
        VideoOrchestrator::new(
            storage,
            Arc::new(FixedImageGenerator),
            Arc::new(FixedFetcher),
            Arc::new(StubMux { fail: fail_mux }),
        )
    }

    #[tokio::test]
    async fn test_successful_run_cleans_temporaries_and_returns_video_url() {
        let storage = Arc::new(MemoryStorage::default());
        let artifacts = orchestrator(Arc::clone(&storage), false)
            .generate(None, "Once upon a time...", "https://audio.example/n.mp3", AspectRatio::Landscape)
            .await
            .unwrap();

        assert!(artifacts.video_url.starts_with("mem://story-videos/"));
        assert!(artifacts.video_url.ends_with(".mp4"));
        assert_eq!(artifacts.processing_method, Some(ProcessingMethod::Ffmpeg));

        // Both temporaries were staged and later removed.
        assert_eq!(storage.deleted.lock().unwrap().len(), 2);
        assert!(storage.objects.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mux_failure_still_cleans_temporaries() {
        let storage = Arc::new(MemoryStorage::default());
        let err = orchestrator(Arc::clone(&storage), true)
            .generate(
                Some("a fox under the moon"),
                "content",
                "https://audio.example/n.mp3",
                AspectRatio::Portrait,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Muxing(_)));
        assert_eq!(storage.deleted.lock().unwrap().len(), 2);
        assert!(storage.objects.lock().unwrap().is_empty());
    }
}
