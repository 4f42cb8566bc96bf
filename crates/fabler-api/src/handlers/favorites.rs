use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use fabler_core::models::StoryResponse;
use fabler_core::AppError;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/api/v1/stories/{id}/favorite",
    tag = "favorites",
    params(("id" = Uuid, Path, description = "Story ID")),
    responses(
        (status = 204, description = "Story favorited (idempotent)"),
        (status = 404, description = "Story not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state),
    fields(user_id = %user.user_id, story_id = %id, operation = "add_favorite")
)]
pub async fn add_favorite(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    state
        .db
        .stories
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Story not found".to_string()))?;

    state.db.stories.add_favorite(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/api/v1/stories/{id}/favorite",
    tag = "favorites",
    params(("id" = Uuid, Path, description = "Story ID")),
    responses(
        (status = 204, description = "Favorite removed"),
        (status = 404, description = "Favorite not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state),
    fields(user_id = %user.user_id, story_id = %id, operation = "remove_favorite")
)]
pub async fn remove_favorite(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let removed = state.db.stories.remove_favorite(user.user_id, id).await?;
    if !removed {
        return Err(AppError::NotFound("Favorite not found".to_string()).into());
    }
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/stories/favorites",
    tag = "favorites",
    responses(
        (status = 200, description = "The caller's favorite stories", body = Vec<StoryResponse>)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(user_id = %user.user_id, operation = "list_favorites"))]
pub async fn list_favorites(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, HttpAppError> {
    let stories = state.db.stories.list_favorites(user.user_id).await?;
    let responses: Vec<StoryResponse> = stories.into_iter().map(StoryResponse::from).collect();
    Ok(Json(responses))
}
