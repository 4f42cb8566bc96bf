//! OpenAPI documentation. All routes live under `/api/v1/` and handler path
//! annotations carry the full versioned path directly.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use fabler_core::models;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Fabler API",
        version = "0.1.0",
        description = "AI story generation API: stories with morals, narrated audio, \
                       illustrations, videos, translations, and a monthly credit ledger. \
                       All endpoints are versioned under /api/v1/."
    ),
    paths(
        // Stories
        handlers::story_generate::generate_story,
        handlers::stories::create_story,
        handlers::stories::get_story,
        handlers::stories::list_stories,
        handlers::stories::update_story,
        handlers::stories::delete_story,
        handlers::story_translate::translate_story,
        // Favorites
        handlers::favorites::add_favorite,
        handlers::favorites::remove_favorite,
        handlers::favorites::list_favorites,
        // Media
        handlers::image_generate::generate_image,
        handlers::audio_generate::generate_audio,
        handlers::audio_generate::list_audio,
        handlers::video_generate::generate_video,
        handlers::asset_record::record_video,
        handlers::asset_record::list_videos,
        handlers::asset_record::record_image,
        handlers::asset_record::record_pdf,
        // Credits
        handlers::credits::credit_usage,
        // Config
        handlers::admin_config::list_config,
        handlers::admin_config::set_config,
        handlers::admin_config::list_content_filters,
        // Webhooks
        handlers::stripe_webhook::stripe_webhook,
    ),
    components(
        schemas(
            models::StoryResponse,
            models::AudioAsset,
            models::VideoAsset,
            models::ImageAsset,
            models::PdfAsset,
            models::TranslationLink,
            models::AspectRatio,
            models::ProcessingMethod,
            models::SubscriptionLevel,
            models::ApiConfiguration,
            models::ContentFilterWord,
            models::CreditLedgerEntry,
            handlers::story_generate::GenerateStoryRequest,
            handlers::story_generate::GenerateStoryResponse,
            handlers::stories::CreateStoryRequest,
            handlers::stories::UpdateStoryRequest,
            handlers::story_translate::TranslateStoryRequest,
            handlers::image_generate::GenerateImageRequest,
            handlers::image_generate::GenerateImageResponse,
            handlers::audio_generate::GenerateAudioRequest,
            handlers::video_generate::GenerateVideoRequest,
            handlers::video_generate::GenerateVideoResponse,
            handlers::asset_record::RecordVideoRequest,
            handlers::asset_record::RecordImageRequest,
            handlers::asset_record::RecordPdfRequest,
            handlers::credits::CreditUsageResponse,
            handlers::admin_config::SetConfigRequest,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "stories", description = "Story generation, CRUD, and translation"),
        (name = "favorites", description = "Story favorites"),
        (name = "audio", description = "Narrated audio"),
        (name = "videos", description = "Story videos"),
        (name = "images", description = "Story illustrations"),
        (name = "pdfs", description = "Client-rendered PDF records"),
        (name = "credits", description = "Monthly credit ledger"),
        (name = "config", description = "Runtime configuration flags"),
        (name = "webhooks", description = "Payment provider webhooks")
    )
)]
pub struct ApiDoc;
