//! Runtime configuration flags and the content filter word list.

use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use fabler_core::models::{ApiConfiguration, ContentFilterWord};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[utoipa::path(
    get,
    path = "/api/v1/config",
    tag = "config",
    responses(
        (status = 200, description = "All configuration flags", body = Vec<ApiConfiguration>)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(user_id = %user.user_id, operation = "list_config"))]
pub async fn list_config(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, HttpAppError> {
    let configurations = state.db.api_configurations.list().await?;
    Ok(Json(configurations))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetConfigRequest {
    pub is_active: bool,
}

#[utoipa::path(
    put,
    path = "/api/v1/config/{key_name}",
    tag = "config",
    params(("key_name" = String, Path, description = "Configuration key")),
    request_body = SetConfigRequest,
    responses(
        (status = 200, description = "Flag updated", body = ApiConfiguration),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, request),
    fields(user_id = %user.user_id, key_name = %key_name, operation = "set_config")
)]
pub async fn set_config(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(key_name): Path<String>,
    ValidatedJson(request): ValidatedJson<SetConfigRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let configuration = state
        .db
        .api_configurations
        .set_active(&key_name, request.is_active)
        .await?;
    Ok(Json(configuration))
}

#[utoipa::path(
    get,
    path = "/api/v1/content-filters",
    tag = "config",
    responses(
        (status = 200, description = "Banned words", body = Vec<ContentFilterWord>)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state),
    fields(user_id = %user.user_id, operation = "list_content_filters")
)]
pub async fn list_content_filters(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, HttpAppError> {
    let words = state.db.content_filters.list().await?;
    Ok(Json(words))
}
