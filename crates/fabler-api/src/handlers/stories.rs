//! Story CRUD. Stories are saved by the client after generation, so creation
//! accepts raw story text and parses the title/body/moral split server-side.

use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use fabler_core::models::{slug_from_title, StoryResponse};
use fabler_core::AppError;
use fabler_db::{NewStory, StoryUpdate};
use fabler_pipeline::ParsedStory;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStoryRequest {
    /// Raw generated story text, including the title line and `Moral:` section.
    #[validate(length(min = 1))]
    pub content: String,
    #[validate(length(min = 1, max = 100))]
    pub age_group: String,
    #[validate(length(min = 1, max = 100))]
    pub genre: String,
    pub language: Option<String>,
    pub tone: Option<String>,
    pub reading_level: Option<String>,
    pub length_preference: Option<String>,
    pub image_prompt: Option<String>,
    #[serde(default)]
    pub reflection_questions: Vec<String>,
    #[serde(default)]
    pub action_steps: Vec<String>,
    pub related_quote: Option<String>,
    #[serde(default)]
    pub discussion_prompts: Vec<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/stories",
    tag = "stories",
    request_body = CreateStoryRequest,
    responses(
        (status = 201, description = "Story saved", body = StoryResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, request),
    fields(user_id = %user.user_id, operation = "create_story")
)]
pub async fn create_story(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateStoryRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate().map_err(AppError::from)?;

    let parsed = ParsedStory::parse(&request.content);
    let slug = slug_from_title(&parsed.title);

    let story = state
        .db
        .stories
        .create(NewStory {
            author_id: user.user_id,
            title: parsed.title,
            content: parsed.body,
            moral: parsed.moral,
            slug,
            age_group: request.age_group,
            genre: request.genre,
            language: request.language,
            tone: request.tone,
            reading_level: request.reading_level,
            length_preference: request.length_preference,
            image_prompt: request.image_prompt,
            reflection_questions: request.reflection_questions,
            action_steps: request.action_steps,
            related_quote: request.related_quote,
            discussion_prompts: request.discussion_prompts,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(StoryResponse::from(story))))
}

#[utoipa::path(
    get,
    path = "/api/v1/stories/{id}",
    tag = "stories",
    params(("id" = Uuid, Path, description = "Story ID")),
    responses(
        (status = 200, description = "Story found", body = StoryResponse),
        (status = 404, description = "Story not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state),
    fields(user_id = %user.user_id, story_id = %id, operation = "get_story")
)]
pub async fn get_story(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let story = state
        .db
        .stories
        .get_owned(id, user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Story not found".to_string()))?;

    Ok(Json(StoryResponse::from(story)))
}

#[utoipa::path(
    get,
    path = "/api/v1/stories",
    tag = "stories",
    responses(
        (status = 200, description = "The caller's stories, newest first", body = Vec<StoryResponse>)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(user_id = %user.user_id, operation = "list_stories"))]
pub async fn list_stories(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, HttpAppError> {
    let stories = state.db.stories.list_by_author(user.user_id).await?;
    let responses: Vec<StoryResponse> = stories.into_iter().map(StoryResponse::from).collect();
    Ok(Json(responses))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStoryRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub moral: Option<String>,
    pub image_prompt: Option<String>,
}

#[utoipa::path(
    put,
    path = "/api/v1/stories/{id}",
    tag = "stories",
    params(("id" = Uuid, Path, description = "Story ID")),
    request_body = UpdateStoryRequest,
    responses(
        (status = 200, description = "Story updated", body = StoryResponse),
        (status = 404, description = "Story not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, request),
    fields(user_id = %user.user_id, story_id = %id, operation = "update_story")
)]
pub async fn update_story(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateStoryRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let story = state
        .db
        .stories
        .update(
            id,
            user.user_id,
            StoryUpdate {
                title: request.title,
                content: request.content,
                moral: request.moral,
                image_prompt: request.image_prompt,
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound("Story not found".to_string()))?;

    Ok(Json(StoryResponse::from(story)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/stories/{id}",
    tag = "stories",
    params(("id" = Uuid, Path, description = "Story ID")),
    responses(
        (status = 204, description = "Story deleted"),
        (status = 404, description = "Story not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state),
    fields(user_id = %user.user_id, story_id = %id, operation = "delete_story")
)]
pub async fn delete_story(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let deleted = state.db.stories.delete(id, user.user_id).await?;
    if !deleted {
        return Err(AppError::NotFound("Story not found".to_string()).into());
    }
    Ok(StatusCode::NO_CONTENT)
}
