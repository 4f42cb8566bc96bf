//! Application state and sub-state extractors.
//!
//! AppState is split into domain sub-states so handlers can extract only what
//! they need via Axum's `FromRef`, and to avoid a single god object.

use std::sync::Arc;

use fabler_db::{
    ApiConfigurationRepository, AudioAssetRepository, ContentFilterRepository, CreditLedger,
    ImageAssetRepository, PdfAssetRepository, ProfileRepository, StoryRepository,
    SubscriptionTierRepository, TranslationRepository, VideoAssetRepository,
};
use fabler_core::Config;
use fabler_genai::{
    ChatClient, ImageGenerator, MediaFetcher, MuxService, OpenAiImageClient, RunwareImageClient,
    SpeechClient,
};
use fabler_pipeline::VideoOrchestrator;
use fabler_storage::Storage;
use sqlx::PgPool;

// ----- Sub-state types -----

/// Database pool and all repositories.
#[derive(Clone)]
pub struct DbState {
    pub pool: PgPool,
    pub stories: StoryRepository,
    pub audio_assets: AudioAssetRepository,
    pub video_assets: VideoAssetRepository,
    pub image_assets: ImageAssetRepository,
    pub pdf_assets: PdfAssetRepository,
    pub translations: TranslationRepository,
    pub profiles: ProfileRepository,
    pub tiers: SubscriptionTierRepository,
    pub api_configurations: ApiConfigurationRepository,
    pub content_filters: ContentFilterRepository,
    pub ledger: Arc<dyn CreditLedger>,
}

/// Generation clients and the storage backend they stage media in.
#[derive(Clone)]
pub struct GenState {
    pub chat: ChatClient,
    pub speech: Option<SpeechClient>,
    pub openai_images: Arc<OpenAiImageClient>,
    pub runware_images: Option<Arc<RunwareImageClient>>,
    pub fetcher: Arc<dyn MediaFetcher>,
    pub mux: Arc<dyn MuxService>,
    pub storage: Arc<dyn Storage>,
    pub orchestrator: Arc<VideoOrchestrator>,
}

impl GenState {
    /// Pick the image provider for a request: Runware when the runtime flag
    /// is on and a Runware client is configured, OpenAI otherwise.
    pub fn image_generator(&self, prefer_runware: bool) -> Arc<dyn ImageGenerator> {
        match (&self.runware_images, prefer_runware) {
            (Some(runware), true) => Arc::clone(runware) as Arc<dyn ImageGenerator>,
            _ => Arc::clone(&self.openai_images) as Arc<dyn ImageGenerator>,
        }
    }
}

// ----- AppState -----

/// Main application state: aggregates sub-states for dependency injection.
#[derive(Clone)]
pub struct AppState {
    pub db: DbState,
    pub gen: GenState,
    pub config: Config,
    pub is_production: bool,
}

// ----- FromRef for sub-state extraction -----

impl axum::extract::FromRef<Arc<AppState>> for DbState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.db.clone()
    }
}

impl axum::extract::FromRef<Arc<AppState>> for GenState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.gen.clone()
    }
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
