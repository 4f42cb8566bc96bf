use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;
use uuid::Uuid;

/// Subscription tier levels, ordered roughly by entitlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "subscription_level", rename_all = "lowercase")
)]
pub enum SubscriptionLevel {
    Free,
    Basic,
    Premium,
    Enterprise,
    Lifetime,
    Credits,
}

impl Display for SubscriptionLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let s = match self {
            SubscriptionLevel::Free => "free",
            SubscriptionLevel::Basic => "basic",
            SubscriptionLevel::Premium => "premium",
            SubscriptionLevel::Enterprise => "enterprise",
            SubscriptionLevel::Lifetime => "lifetime",
            SubscriptionLevel::Credits => "credits",
        };
        write!(f, "{}", s)
    }
}

/// A user profile row mirrored from the auth provider.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Profile {
    pub id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub subscription_level: Option<SubscriptionLevel>,
    pub updated_at: DateTime<Utc>,
}

/// A purchasable subscription tier, matched to payment-provider price ids.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionTier {
    pub id: Uuid,
    pub name: String,
    pub level: SubscriptionLevel,
    pub monthly_credits: i32,
    pub saved_stories_limit: i32,
    pub stripe_price_id: Option<String>,
    pub stripe_yearly_price_id: Option<String>,
}

/// A mutable configuration flag row, e.g. `IMAGE_GENERATION_PROVIDER`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiConfiguration {
    pub id: Uuid,
    pub key_name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

/// A banned word in the content filter list.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContentFilterWord {
    pub id: Uuid,
    pub word: String,
    pub category: String,
}
