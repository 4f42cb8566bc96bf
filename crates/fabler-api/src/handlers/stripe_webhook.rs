//! Payment provider webhook.
//!
//! Signature scheme: the `Stripe-Signature` header carries `t=<unix ts>` and
//! one or more `v1=<hex hmac>` entries; the expected signature is
//! HMAC-SHA256 over `{t}.{raw payload}` with the webhook secret. Verification
//! uses a constant-time compare and a timestamp tolerance window. The raw body
//! must be hashed exactly as received, so this handler takes `String` rather
//! than a JSON extractor.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{extract::State, http::HeaderMap, response::IntoResponse, Json};
use fabler_core::models::SubscriptionLevel;
use fabler_core::{AppError, MonthKey};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::json;
use sha2::Sha256;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Maximum accepted age (and future skew) of a signed payload, in seconds.
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<String>,
}

fn parse_signature_header(header: &str) -> Result<SignatureHeader, AppError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => {
                timestamp = value.parse::<i64>().ok();
            }
            Some(("v1", value)) => {
                signatures.push(value.to_string());
            }
            _ => {}
        }
    }

    let timestamp = timestamp
        .ok_or_else(|| AppError::Webhook("Missing timestamp in signature header".to_string()))?;
    if signatures.is_empty() {
        return Err(AppError::Webhook(
            "Missing v1 signature in signature header".to_string(),
        ));
    }
    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Verify a signed payload. `now` is passed in so tests can pin the clock.
fn verify_signature(
    payload: &str,
    header: &str,
    secret: &str,
    now: i64,
) -> Result<(), AppError> {
    let parsed = parse_signature_header(header)?;

    if (now - parsed.timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(AppError::Webhook(
            "Signature timestamp outside tolerance".to_string(),
        ));
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| AppError::Webhook("Invalid webhook secret".to_string()))?;
    mac.update(format!("{}.{}", parsed.timestamp, payload).as_bytes());
    let expected = hex::encode(mac.finalize().into_bytes());

    if parsed
        .signatures
        .iter()
        .any(|candidate| secure_compare(candidate, &expected))
    {
        Ok(())
    } else {
        Err(AppError::Webhook("Signature mismatch".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct WebhookEvent {
    #[serde(rename = "type")]
    event_type: String,
    data: WebhookEventData,
}

#[derive(Debug, Deserialize)]
struct WebhookEventData {
    object: WebhookObject,
}

#[derive(Debug, Deserialize)]
struct WebhookObject {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    metadata: Metadata,
    #[serde(default)]
    items: Option<SubscriptionItems>,
}

#[derive(Debug, Default, Deserialize)]
struct Metadata {
    #[serde(default)]
    user_id: Option<Uuid>,
    #[serde(default)]
    price_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionItems {
    #[serde(default)]
    data: Vec<SubscriptionItem>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionItem {
    price: Price,
}

#[derive(Debug, Deserialize)]
struct Price {
    id: String,
}

impl WebhookObject {
    fn price_id(&self) -> Option<&str> {
        self.items
            .as_ref()
            .and_then(|items| items.data.first())
            .map(|item| item.price.id.as_str())
            .or(self.metadata.price_id.as_deref())
    }

    fn user_id(&self) -> Result<Uuid, AppError> {
        self.metadata
            .user_id
            .ok_or_else(|| AppError::Webhook("Event metadata missing user_id".to_string()))
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/webhooks/stripe",
    tag = "webhooks",
    responses(
        (status = 200, description = "Event processed"),
        (status = 400, description = "Bad signature or malformed event", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, headers, payload), fields(operation = "stripe_webhook"))]
pub async fn stripe_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: String,
) -> Result<impl IntoResponse, HttpAppError> {
    let signature = headers
        .get("Stripe-Signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Webhook("Missing Stripe-Signature header".to_string()))?;

    verify_signature(
        &payload,
        signature,
        &state.config.stripe_webhook_secret,
        chrono::Utc::now().timestamp(),
    )?;

    let event: WebhookEvent = serde_json::from_str(&payload)
        .map_err(|e| AppError::Webhook(format!("Malformed event payload: {}", e)))?;

    tracing::info!(event_type = %event.event_type, "Processing payment webhook event");

    match event.event_type.as_str() {
        "customer.subscription.created" | "customer.subscription.updated" => {
            subscription_changed(&state, &event.data.object).await?;
        }
        "customer.subscription.deleted" => {
            let user_id = event.data.object.user_id()?;
            state
                .db
                .profiles
                .set_subscription_level(user_id, SubscriptionLevel::Free)
                .await?;
            tracing::info!(user_id = %user_id, "Subscription cancelled, reset to free");
        }
        "checkout.session.completed" => {
            checkout_completed(&state, &event.data.object).await?;
        }
        "invoice.payment_succeeded" => {
            tracing::info!(
                invoice_id = ?event.data.object.id,
                "Invoice payment succeeded"
            );
        }
        other => {
            tracing::debug!(event_type = %other, "Ignoring unhandled webhook event");
        }
    }

    Ok(Json(json!({ "received": true })))
}

async fn subscription_changed(
    state: &AppState,
    object: &WebhookObject,
) -> Result<(), AppError> {
    let user_id = object.user_id()?;
    let price_id = object
        .price_id()
        .ok_or_else(|| AppError::Webhook("Subscription event missing price id".to_string()))?;

    let tier = state
        .db
        .tiers
        .get_by_price_id(price_id)
        .await?
        .ok_or_else(|| AppError::Webhook(format!("Unknown price id: {}", price_id)))?;

    state
        .db
        .profiles
        .set_subscription_level(user_id, tier.level)
        .await?;
    tracing::info!(user_id = %user_id, level = %tier.level, "Subscription level updated");
    Ok(())
}

async fn checkout_completed(state: &AppState, object: &WebhookObject) -> Result<(), AppError> {
    // Only one-off payment checkouts need handling here; subscription
    // checkouts are followed by their own subscription events.
    if object.mode.as_deref() != Some("payment") {
        return Ok(());
    }

    let user_id = object.user_id()?;

    if let Some(price_id) = object.price_id() {
        if let Some(tier) = state.db.tiers.get_by_price_id(price_id).await? {
            state
                .db
                .profiles
                .set_subscription_level(user_id, tier.level)
                .await?;
        }
    }

    // A zero increment creates the current-month ledger row if it is missing
    // and leaves an existing counter untouched.
    state
        .db
        .ledger
        .add_credits(user_id, &MonthKey::current(), 0)
        .await?;
    tracing::info!(user_id = %user_id, "Checkout completed, ledger row ensured");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";

    fn sign(payload: &str, timestamp: i64, secret: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac key");
        mac.update(format!("{}.{}", timestamp, payload).as_bytes());
        format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn test_valid_signature_accepted() {
        let payload = r#"{"type":"invoice.payment_succeeded","data":{"object":{}}}"#;
        let header = sign(payload, 1_700_000_000, SECRET);
        assert!(verify_signature(payload, &header, SECRET, 1_700_000_000).is_ok());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let payload = "{}";
        let header = sign(payload, 1_700_000_000, "other_secret");
        let err = verify_signature(payload, &header, SECRET, 1_700_000_000).unwrap_err();
        assert!(matches!(err, AppError::Webhook(_)));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let header = sign("{}", 1_700_000_000, SECRET);
        let err =
            verify_signature(r#"{"evil":true}"#, &header, SECRET, 1_700_000_000).unwrap_err();
        assert!(matches!(err, AppError::Webhook(_)));
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let payload = "{}";
        let header = sign(payload, 1_700_000_000, SECRET);
        let err = verify_signature(
            payload,
            &header,
            SECRET,
            1_700_000_000 + SIGNATURE_TOLERANCE_SECS + 1,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Webhook(_)));
    }

    #[test]
    fn test_any_matching_v1_entry_accepted() {
        let payload = "{}";
        let timestamp = 1_700_000_000;
        let valid = sign(payload, timestamp, SECRET);
        let valid_sig = valid.split("v1=").nth(1).unwrap();
        let header = format!("t={},v1={},v1={}", timestamp, "0".repeat(64), valid_sig);
        assert!(verify_signature(payload, &header, SECRET, timestamp).is_ok());
    }

    #[test]
    fn test_missing_header_parts_rejected() {
        assert!(parse_signature_header("v1=abc").is_err());
        assert!(parse_signature_header("t=123").is_err());
    }

    #[test]
    fn test_subscription_event_price_id_from_items() {
        let payload = r#"{
            "type": "customer.subscription.updated",
            "data": {"object": {
                "metadata": {"user_id": "7f3b3c0a-95a2-4f4a-9a3e-111111111111"},
                "items": {"data": [{"price": {"id": "price_basic_monthly"}}]}
            }}
        }"#;
        let event: WebhookEvent = serde_json::from_str(payload).expect("parse event");
        assert_eq!(event.data.object.price_id(), Some("price_basic_monthly"));
        assert!(event.data.object.user_id().is_ok());
    }

    #[test]
    fn test_checkout_event_mode_and_metadata_parse() {
        let payload = r#"{
            "type": "checkout.session.completed",
            "data": {"object": {
                "id": "cs_test_1",
                "mode": "payment",
                "metadata": {"user_id": "7f3b3c0a-95a2-4f4a-9a3e-111111111111"}
            }}
        }"#;
        let event: WebhookEvent = serde_json::from_str(payload).expect("parse event");
        assert_eq!(event.data.object.mode.as_deref(), Some("payment"));
    }
}
