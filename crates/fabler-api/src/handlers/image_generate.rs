//! Standalone illustration generation. The safety check runs before any paid
//! upstream call; the provider is chosen per-request from the
//! `IMAGE_GENERATION_PROVIDER` configuration row.

use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use fabler_core::models::AspectRatio;
use fabler_core::{AppError, ContentSafetyFilter};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

/// Configuration row toggling the image provider: active means Runware.
pub const IMAGE_PROVIDER_FLAG: &str = "IMAGE_GENERATION_PROVIDER";

fn default_aspect_ratio() -> AspectRatio {
    AspectRatio::Landscape
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GenerateImageRequest {
    #[validate(length(min = 1, max = 2000))]
    pub prompt: String,
    pub style: Option<String>,
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: AspectRatio,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateImageResponse {
    pub image_url: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/images/generate",
    tag = "images",
    request_body = GenerateImageRequest,
    responses(
        (status = 200, description = "Image generated", body = GenerateImageResponse),
        (status = 400, description = "Prompt rejected by content filter", body = ErrorResponse),
        (status = 502, description = "Image provider failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, request),
    fields(user_id = %user.user_id, operation = "generate_image")
)]
pub async fn generate_image(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedJson(request): ValidatedJson<GenerateImageRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate().map_err(AppError::from)?;

    // Reject banned prompts before spending anything upstream.
    let extra_words = state.db.content_filters.list_words().await?;
    ContentSafetyFilter::new(extra_words).check(&request.prompt)?;

    let prefer_runware = state
        .db
        .api_configurations
        .is_active(IMAGE_PROVIDER_FLAG)
        .await?;

    let mut prompt = format!(
        "Create a safe, family-friendly illustration: {}",
        request.prompt
    );
    if let Some(style) = request.style.as_deref().filter(|s| !s.trim().is_empty()) {
        prompt.push_str(&format!(" Style: {}.", style.trim()));
    }

    let image_url = state
        .gen
        .image_generator(prefer_runware)
        .generate(&prompt, request.aspect_ratio)
        .await?;

    Ok(Json(GenerateImageResponse { image_url }))
}
