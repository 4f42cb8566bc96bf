//! Video generation: run the image -> stage -> mux pipeline for a story.
//! This handler only produces the video; the client records the asset row via
//! the record endpoint once it has shown the result to the user.

use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use fabler_core::models::{AspectRatio, ProcessingMethod};
use fabler_core::AppError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GenerateVideoRequest {
    /// Public URL of an already-generated narration to use as the soundtrack.
    #[validate(url)]
    pub audio_url: String,
    pub aspect_ratio: AspectRatio,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateVideoResponse {
    pub video_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_method: Option<ProcessingMethod>,
}

#[utoipa::path(
    post,
    path = "/api/v1/stories/{id}/video",
    tag = "videos",
    params(("id" = Uuid, Path, description = "Story ID")),
    request_body = GenerateVideoRequest,
    responses(
        (status = 200, description = "Video produced", body = GenerateVideoResponse),
        (status = 404, description = "Story not found", body = ErrorResponse),
        (status = 502, description = "A pipeline stage failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, request),
    fields(user_id = %user.user_id, story_id = %id, operation = "generate_video")
)]
pub async fn generate_video(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<GenerateVideoRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate().map_err(AppError::from)?;

    let story = state
        .db
        .stories
        .get_owned(id, user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Story not found".to_string()))?;

    let artifacts = state
        .gen
        .orchestrator
        .generate(
            story.image_prompt.as_deref(),
            &story.content,
            &request.audio_url,
            request.aspect_ratio,
        )
        .await?;

    Ok(Json(GenerateVideoResponse {
        video_url: artifacts.video_url,
        processing_method: artifacts.processing_method,
    }))
}
