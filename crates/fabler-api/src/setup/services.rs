//! Service and repository initialization

use std::sync::Arc;

use anyhow::{Context, Result};
use fabler_core::Config;
use fabler_db::{
    ApiConfigurationRepository, AudioAssetRepository, ContentFilterRepository,
    ImageAssetRepository, PdfAssetRepository, PgCreditLedger, ProfileRepository, StoryRepository,
    SubscriptionTierRepository, TranslationRepository, VideoAssetRepository,
};
use fabler_genai::{
    ChatClient, HttpMediaFetcher, HttpMuxService, OpenAiImageClient, RunwareImageClient,
    SpeechClient,
};
use fabler_pipeline::VideoOrchestrator;
use fabler_storage::Storage;
use sqlx::PgPool;

use crate::state::{AppState, DbState, GenState};

/// Build repositories, generation clients, and the shared application state.
pub fn initialize_services(
    config: &Config,
    pool: PgPool,
    storage: Arc<dyn Storage>,
) -> Result<Arc<AppState>> {
    let db = DbState {
        pool: pool.clone(),
        stories: StoryRepository::new(pool.clone()),
        audio_assets: AudioAssetRepository::new(pool.clone()),
        video_assets: VideoAssetRepository::new(pool.clone()),
        image_assets: ImageAssetRepository::new(pool.clone()),
        pdf_assets: PdfAssetRepository::new(pool.clone()),
        translations: TranslationRepository::new(pool.clone()),
        profiles: ProfileRepository::new(pool.clone()),
        tiers: SubscriptionTierRepository::new(pool.clone()),
        api_configurations: ApiConfigurationRepository::new(pool.clone()),
        content_filters: ContentFilterRepository::new(pool.clone()),
        ledger: Arc::new(PgCreditLedger::new(pool)),
    };

    let chat = ChatClient::new(
        config.openai_base_url.clone(),
        config.openai_api_key.clone(),
    )
    .context("Failed to create chat client")?;

    let speech = match &config.elevenlabs_api_key {
        Some(api_key) => Some(
            SpeechClient::new(config.elevenlabs_base_url.clone(), api_key.clone())
                .context("Failed to create speech client")?,
        ),
        None => {
            tracing::warn!("ELEVENLABS_API_KEY not set, narration generation disabled");
            None
        }
    };

    let openai_images = Arc::new(
        OpenAiImageClient::new(
            config.openai_base_url.clone(),
            config.openai_api_key.clone(),
            config.image_model.clone(),
        )
        .context("Failed to create image client")?,
    );

    let runware_images = match &config.runware_api_key {
        Some(api_key) => Some(Arc::new(
            RunwareImageClient::new(config.runware_base_url.clone(), api_key.clone())
                .context("Failed to create Runware client")?,
        )),
        None => None,
    };

    let fetcher = Arc::new(HttpMediaFetcher::new().context("Failed to create media fetcher")?);
    let mux = Arc::new(
        HttpMuxService::new(config.mux_service_url.clone())
            .context("Failed to create mux service client")?,
    );

    let orchestrator = Arc::new(VideoOrchestrator::new(
        storage.clone(),
        openai_images.clone(),
        fetcher.clone(),
        mux.clone(),
    ));

    let gen = GenState {
        chat,
        speech,
        openai_images,
        runware_images,
        fetcher,
        mux,
        storage,
        orchestrator,
    };

    tracing::info!("Services initialized");

    Ok(Arc::new(AppState {
        db,
        gen,
        config: config.clone(),
        is_production: config.is_production(),
    }))
}
