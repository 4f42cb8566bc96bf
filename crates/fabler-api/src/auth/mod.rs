//! Request authentication.
//!
//! Every user-facing route extracts [`AuthUser`], which validates the
//! `Authorization: Bearer <jwt>` header with HS256 and the shared secret from
//! configuration. Handlers never look at the raw token themselves.

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use fabler_core::AppError;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::HttpAppError;
use crate::state::AppState;

/// Claims we require in access tokens. Extra claims are ignored.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's id.
    pub sub: Uuid,
    /// Expiration as a unix timestamp.
    pub exp: i64,
}

/// Authenticated user extracted from a validated bearer token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
}

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid Authorization header".to_string()))?;

    header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Expected Bearer authentication".to_string()))
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = HttpAppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = decode_token(token, &state.config.jwt_secret)?;
        Ok(AuthUser {
            user_id: claims.sub,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn make_token(secret: &str, exp_offset_secs: i64) -> (Uuid, String) {
        let user_id = Uuid::new_v4();
        let claims = Claims {
            sub: user_id,
            exp: chrono::Utc::now().timestamp() + exp_offset_secs,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("encode token");
        (user_id, token)
    }

    #[test]
    fn test_decode_valid_token() {
        let (user_id, token) = make_token("test-secret", 3600);
        let claims = decode_token(&token, "test-secret").expect("valid token");
        assert_eq!(claims.sub, user_id);
    }

    #[test]
    fn test_decode_rejects_wrong_secret() {
        let (_, token) = make_token("test-secret", 3600);
        let err = decode_token(&token, "other-secret").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_decode_rejects_expired_token() {
        let (_, token) = make_token("test-secret", -3600);
        let err = decode_token(&token, "test-secret").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
