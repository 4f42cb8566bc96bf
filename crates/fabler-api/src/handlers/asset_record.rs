//! Asset record endpoints. Video, image, and PDF media are produced (or
//! rendered client-side, for PDFs) before being committed here; recording an
//! asset is what spends the credits.

use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use fabler_core::models::{AspectRatio, ImageAsset, PdfAsset, ProcessingMethod, VideoAsset};
use fabler_core::{AppError, MonthKey};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

fn default_credits() -> i32 {
    1
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RecordVideoRequest {
    #[validate(url)]
    pub video_url: String,
    pub aspect_ratio: AspectRatio,
    pub processing_method: Option<ProcessingMethod>,
    #[serde(default = "default_credits")]
    #[validate(range(min = 0))]
    pub credits_used: i32,
}

#[utoipa::path(
    post,
    path = "/api/v1/stories/{id}/videos",
    tag = "videos",
    params(("id" = Uuid, Path, description = "Story ID")),
    request_body = RecordVideoRequest,
    responses(
        (status = 201, description = "Video asset recorded", body = VideoAsset),
        (status = 404, description = "Story not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, request),
    fields(user_id = %user.user_id, story_id = %id, operation = "record_video")
)]
pub async fn record_video(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<RecordVideoRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate().map_err(AppError::from)?;
    let story = require_owned_story(&state, id, user.user_id).await?;

    let asset = state
        .db
        .video_assets
        .create(
            story.id,
            user.user_id,
            &request.video_url,
            request.aspect_ratio,
            request.processing_method,
            request.credits_used,
        )
        .await?;

    debit(&state, user.user_id, request.credits_used).await?;
    Ok((StatusCode::CREATED, Json(asset)))
}

#[utoipa::path(
    get,
    path = "/api/v1/stories/{id}/videos",
    tag = "videos",
    params(("id" = Uuid, Path, description = "Story ID")),
    responses(
        (status = 200, description = "Video assets for the story", body = Vec<VideoAsset>)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state),
    fields(user_id = %user.user_id, story_id = %id, operation = "list_videos")
)]
pub async fn list_videos(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let assets = state.db.video_assets.list_for_story(id, user.user_id).await?;
    Ok(Json(assets))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RecordImageRequest {
    #[validate(url)]
    pub image_url: String,
    pub aspect_ratio: AspectRatio,
    #[serde(default = "default_credits")]
    #[validate(range(min = 0))]
    pub credits_used: i32,
}

#[utoipa::path(
    post,
    path = "/api/v1/stories/{id}/images",
    tag = "images",
    params(("id" = Uuid, Path, description = "Story ID")),
    request_body = RecordImageRequest,
    responses(
        (status = 201, description = "Image asset recorded", body = ImageAsset),
        (status = 404, description = "Story not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, request),
    fields(user_id = %user.user_id, story_id = %id, operation = "record_image")
)]
pub async fn record_image(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<RecordImageRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate().map_err(AppError::from)?;
    let story = require_owned_story(&state, id, user.user_id).await?;

    let asset = state
        .db
        .image_assets
        .create(
            story.id,
            user.user_id,
            &request.image_url,
            request.aspect_ratio,
            request.credits_used,
        )
        .await?;

    debit(&state, user.user_id, request.credits_used).await?;
    Ok((StatusCode::CREATED, Json(asset)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RecordPdfRequest {
    #[validate(url)]
    pub pdf_url: String,
    #[serde(default = "default_credits")]
    #[validate(range(min = 0))]
    pub credits_used: i32,
}

#[utoipa::path(
    post,
    path = "/api/v1/stories/{id}/pdf",
    tag = "pdfs",
    params(("id" = Uuid, Path, description = "Story ID")),
    request_body = RecordPdfRequest,
    responses(
        (status = 201, description = "PDF asset recorded", body = PdfAsset),
        (status = 404, description = "Story not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, request),
    fields(user_id = %user.user_id, story_id = %id, operation = "record_pdf")
)]
pub async fn record_pdf(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<RecordPdfRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate().map_err(AppError::from)?;
    let story = require_owned_story(&state, id, user.user_id).await?;

    let asset = state
        .db
        .pdf_assets
        .create(story.id, user.user_id, &request.pdf_url, request.credits_used)
        .await?;

    debit(&state, user.user_id, request.credits_used).await?;
    Ok((StatusCode::CREATED, Json(asset)))
}

async fn require_owned_story(
    state: &AppState,
    story_id: Uuid,
    user_id: Uuid,
) -> Result<fabler_core::models::Story, AppError> {
    state
        .db
        .stories
        .get_owned(story_id, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Story not found".to_string()))
}

async fn debit(state: &AppState, user_id: Uuid, amount: i32) -> Result<(), AppError> {
    if amount > 0 {
        state
            .db
            .ledger
            .add_credits(user_id, &MonthKey::current(), amount)
            .await?;
    }
    Ok(())
}
