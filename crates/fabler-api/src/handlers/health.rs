use crate::state::AppState;
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

/// Liveness + database check. Returns 503 when the pool cannot run a trivial
/// query so orchestrators stop routing traffic here.
pub async fn health_check(state: Arc<AppState>) -> impl IntoResponse {
    let db_ok = sqlx::query("SELECT 1")
        .execute(&state.db.pool)
        .await
        .is_ok();

    let status = if db_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if db_ok { "healthy" } else { "unhealthy" },
            "database": if db_ok { "up" } else { "down" },
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}
