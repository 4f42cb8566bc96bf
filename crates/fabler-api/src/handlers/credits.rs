//! Credit usage query: how much of the monthly allowance the caller has spent.

use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use fabler_core::models::SubscriptionLevel;
use fabler_core::{AppError, MonthKey};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct UsageQuery {
    /// Month to query as `YYYY-MM`; defaults to the current month.
    pub month: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreditUsageResponse {
    /// Month the usage applies to, `YYYY-MM`.
    pub month: String,
    pub credits_used: i32,
    pub subscription_level: SubscriptionLevel,
    /// Monthly allowance for the caller's tier; absent when the tier has no
    /// row (e.g. legacy levels).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_credits: Option<i32>,
}

#[utoipa::path(
    get,
    path = "/api/v1/credits/usage",
    tag = "credits",
    params(UsageQuery),
    responses(
        (status = 200, description = "Credit usage for the month", body = CreditUsageResponse),
        (status = 400, description = "Malformed month", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(user_id = %user.user_id, operation = "credit_usage"))]
pub async fn credit_usage(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(query): Query<UsageQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let month = match query.month.as_deref() {
        Some(raw) => MonthKey::parse(raw)
            .ok_or_else(|| AppError::InvalidInput(format!("Malformed month: {}", raw)))?,
        None => MonthKey::current(),
    };

    let credits_used = state.db.ledger.usage(user.user_id, &month).await?;

    let subscription_level = state
        .db
        .profiles
        .get_by_id(user.user_id)
        .await?
        .and_then(|profile| profile.subscription_level)
        .unwrap_or(SubscriptionLevel::Free);

    let monthly_credits = state
        .db
        .tiers
        .get_by_level(subscription_level)
        .await?
        .map(|tier| tier.monthly_credits);

    Ok(Json(CreditUsageResponse {
        month: month.as_str().to_string(),
        credits_used,
        subscription_level,
        monthly_credits,
    }))
}
