//! Narration generation: synthesize speech for a story, store the audio in
//! the `story-audio` bucket, and record the asset.

use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use fabler_core::models::AudioAsset;
use fabler_core::{AppError, MonthKey};
use fabler_storage::{keys, STORY_AUDIO_BUCKET};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GenerateAudioRequest {
    /// Provider voice id to narrate with.
    #[validate(length(min = 1, max = 100))]
    pub voice_id: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/stories/{id}/audio",
    tag = "audio",
    params(("id" = Uuid, Path, description = "Story ID")),
    request_body = GenerateAudioRequest,
    responses(
        (status = 201, description = "Narration created", body = AudioAsset),
        (status = 404, description = "Story not found", body = ErrorResponse),
        (status = 502, description = "Speech provider failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, request),
    fields(user_id = %user.user_id, story_id = %id, operation = "generate_audio")
)]
pub async fn generate_audio(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<GenerateAudioRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate().map_err(AppError::from)?;

    let speech = state.gen.speech.as_ref().ok_or_else(|| {
        AppError::Internal("Text-to-speech provider is not configured".to_string())
    })?;

    let story = state
        .db
        .stories
        .get_owned(id, user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Story not found".to_string()))?;

    // Narrate title, body, and moral as one continuous read.
    let narration = format!("{}\n\n{}\n\nMoral: {}", story.title, story.content, story.moral);
    let audio = speech.synthesize(&narration, &request.voice_id).await?;

    let key = keys::audio_object_key();
    let audio_url = state
        .gen
        .storage
        .upload(STORY_AUDIO_BUCKET, &key, audio, "audio/mpeg")
        .await?;

    let asset = state
        .db
        .audio_assets
        .create(story.id, user.user_id, &audio_url, &request.voice_id, 1)
        .await?;

    state
        .db
        .ledger
        .add_credits(user.user_id, &MonthKey::current(), 1)
        .await?;

    Ok((StatusCode::CREATED, Json(asset)))
}

#[utoipa::path(
    get,
    path = "/api/v1/stories/{id}/audio",
    tag = "audio",
    params(("id" = Uuid, Path, description = "Story ID")),
    responses(
        (status = 200, description = "Narrations for the story", body = Vec<AudioAsset>)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state),
    fields(user_id = %user.user_id, story_id = %id, operation = "list_audio")
)]
pub async fn list_audio(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let assets = state.db.audio_assets.list_for_story(id, user.user_id).await?;
    Ok(Json(assets))
}
