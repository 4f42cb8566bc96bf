pub mod admin_config;
pub mod asset_record;
pub mod audio_generate;
pub mod credits;
pub mod favorites;
pub mod health;
pub mod image_generate;
pub mod stories;
pub mod story_generate;
pub mod story_translate;
pub mod stripe_webhook;
pub mod video_generate;
