//! Route configuration and setup.

use crate::constants::API_PREFIX;
use crate::handlers;
use crate::state::AppState;
use axum::{
    http::{HeaderValue, Method},
    routing::{get, post, put},
    Json, Router,
};
use fabler_core::Config;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;

    let api = Router::new()
        .route("/stories/generate", post(handlers::story_generate::generate_story))
        .route(
            "/stories",
            post(handlers::stories::create_story).get(handlers::stories::list_stories),
        )
        .route("/stories/favorites", get(handlers::favorites::list_favorites))
        .route(
            "/stories/{id}",
            get(handlers::stories::get_story)
                .put(handlers::stories::update_story)
                .delete(handlers::stories::delete_story),
        )
        .route(
            "/stories/{id}/favorite",
            post(handlers::favorites::add_favorite).delete(handlers::favorites::remove_favorite),
        )
        .route(
            "/stories/{id}/translate",
            post(handlers::story_translate::translate_story),
        )
        .route(
            "/stories/{id}/audio",
            post(handlers::audio_generate::generate_audio)
                .get(handlers::audio_generate::list_audio),
        )
        .route(
            "/stories/{id}/video",
            post(handlers::video_generate::generate_video),
        )
        .route(
            "/stories/{id}/videos",
            post(handlers::asset_record::record_video).get(handlers::asset_record::list_videos),
        )
        .route("/stories/{id}/images", post(handlers::asset_record::record_image))
        .route("/stories/{id}/pdf", post(handlers::asset_record::record_pdf))
        .route("/images/generate", post(handlers::image_generate::generate_image))
        .route("/credits/usage", get(handlers::credits::credit_usage))
        .route("/config", get(handlers::admin_config::list_config))
        .route("/config/{key_name}", put(handlers::admin_config::set_config))
        .route(
            "/content-filters",
            get(handlers::admin_config::list_content_filters),
        )
        .route("/webhooks/stripe", post(handlers::stripe_webhook::stripe_webhook));

    let app = Router::new()
        .route(
            "/health",
            get({
                let state = state.clone();
                move || {
                    let state = state.clone();
                    async { handlers::health::health_check(state).await }
                }
            }),
        )
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
        .nest(API_PREFIX, api)
        .nest(
            "/docs",
            utoipa_rapidoc::RapiDoc::new("/api/openapi.json")
                .path("/docs")
                .into(),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let cors = if config.cors_origins.contains(&"*".to_string()) {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins: Result<Vec<HeaderValue>, _> =
            config.cors_origins.iter().map(|o| o.parse()).collect();
        CorsLayer::new()
            .allow_origin(origins.unwrap_or_default())
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
