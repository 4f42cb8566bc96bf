//! Story translation. One chat call with labeled sections, a tolerant parse,
//! then a new story row in the target language linked back to the original.

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
use fabler_core::{AppError, MonthKey};
use fabler_db::NewStory;
use fabler_genai::{ChatMessage, ChatOptions};
use fabler_pipeline::prompt::{translation_system_prompt, translation_user_prompt};
use fabler_pipeline::TranslatedStory;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TranslateStoryRequest {
    /// Target language name, e.g. "Spanish".
    #[validate(length(min = 1, max = 50))]
    pub language: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/stories/{id}/translate",
    tag = "stories",
    params(("id" = Uuid, Path, description = "Story ID")),
    request_body = TranslateStoryRequest,
    responses(
        (status = 201, description = "Translated story created", body = StoryResponse),
        (status = 404, description = "Story not found", body = ErrorResponse),
        (status = 502, description = "Translation provider failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, request),
    fields(user_id = %user.user_id, story_id = %id, operation = "translate_story")
)]
pub async fn translate_story(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<TranslateStoryRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate().map_err(AppError::from)?;

    let story = state
        .db
        .stories
        .get_owned(id, user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Story not found".to_string()))?;

    let messages = [
        ChatMessage::system(translation_system_prompt(&request.language)),
        ChatMessage::user(translation_user_prompt(&story, &request.language)),
    ];
    let raw = state
        .gen
        .chat
        .complete(
            &state.config.translation_model,
            &messages,
            &ChatOptions::default(),
        )
        .await?;

    let translated = TranslatedStory::parse(&raw, &story, &request.language);

    // Same slugging scheme as new stories, suffixed with the target language so
    // the original and its translations never collide.
    let slug = format!(
        "{}-{}",
        story.slug,
        slug_from_title(&request.language)
    );

    let translated_story = state
        .db
        .stories
        .create(NewStory {
            author_id: user.user_id,
            title: translated.title,
            content: translated.content,
            moral: translated.moral,
            slug,
            age_group: story.age_group.clone(),
            genre: story.genre.clone(),
            language: Some(request.language.clone()),
            tone: story.tone.clone(),
            reading_level: story.reading_level.clone(),
            length_preference: story.length_preference.clone(),
            image_prompt: story.image_prompt.clone(),
            reflection_questions: translated.reflection_questions,
            action_steps: translated.action_steps,
            related_quote: if translated.related_quote.is_empty() {
                None
            } else {
                Some(translated.related_quote)
            },
            discussion_prompts: translated.discussion_prompts,
        })
        .await?;

    state
        .db
        .translations
        .create(
            story.id,
            translated_story.id,
            &request.language,
            user.user_id,
            1,
        )
        .await?;

    state
        .db
        .ledger
        .add_credits(user.user_id, &MonthKey::current(), 1)
        .await?;

    Ok((StatusCode::CREATED, Json(StoryResponse::from(translated_story))))
}
