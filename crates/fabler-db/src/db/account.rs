//! Account-side repositories: profiles, subscription tiers, runtime
//! configuration flags, and the content filter word list.

use chrono::{DateTime, Utc};
use fabler_core::models::{ApiConfiguration, ContentFilterWord, Profile, SubscriptionLevel, SubscriptionTier};
use fabler_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub subscription_level: Option<SubscriptionLevel>,
    pub updated_at: DateTime<Utc>,
}

impl ProfileRow {
    fn into_profile(self) -> Profile {
        Profile {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            subscription_level: self.subscription_level,
            updated_at: self.updated_at,
        }
    }
}

/// Repository for the profiles table.
#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "profiles", db.record_id = %id))]
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Profile>, AppError> {
        let row: Option<ProfileRow> = sqlx::query_as::<Postgres, ProfileRow>(
            "SELECT id, first_name, last_name, subscription_level, updated_at FROM profiles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(ProfileRow::into_profile))
    }

    /// Set a user's subscription level. Returns true if the profile exists.
    #[tracing::instrument(skip(self), fields(db.table = "profiles", db.record_id = %id))]
    pub async fn set_subscription_level(
        &self,
        id: Uuid,
        level: SubscriptionLevel,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE profiles SET subscription_level = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(level)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct SubscriptionTierRow {
    pub id: Uuid,
    pub name: String,
    pub level: SubscriptionLevel,
    pub monthly_credits: i32,
    pub saved_stories_limit: i32,
    pub stripe_price_id: Option<String>,
    pub stripe_yearly_price_id: Option<String>,
}

impl SubscriptionTierRow {
    fn into_tier(self) -> SubscriptionTier {
        SubscriptionTier {
            id: self.id,
            name: self.name,
            level: self.level,
            monthly_credits: self.monthly_credits,
            saved_stories_limit: self.saved_stories_limit,
            stripe_price_id: self.stripe_price_id,
            stripe_yearly_price_id: self.stripe_yearly_price_id,
        }
    }
}

const TIER_COLUMNS: &str = "id, name, level, monthly_credits, saved_stories_limit, \
     stripe_price_id, stripe_yearly_price_id";

/// Repository for the subscription_tiers table.
#[derive(Clone)]
pub struct SubscriptionTierRepository {
    pool: PgPool,
}

impl SubscriptionTierRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Match a payment-provider price id against either the monthly or yearly
    /// price of a tier.
    #[tracing::instrument(skip(self), fields(db.table = "subscription_tiers"))]
    pub async fn get_by_price_id(
        &self,
        price_id: &str,
    ) -> Result<Option<SubscriptionTier>, AppError> {
        let row: Option<SubscriptionTierRow> = sqlx::query_as::<Postgres, SubscriptionTierRow>(
            &format!(
                "SELECT {TIER_COLUMNS} FROM subscription_tiers \
                 WHERE stripe_price_id = $1 OR stripe_yearly_price_id = $1",
            ),
        )
        .bind(price_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(SubscriptionTierRow::into_tier))
    }

    #[tracing::instrument(skip(self), fields(db.table = "subscription_tiers"))]
    pub async fn get_by_level(
        &self,
        level: SubscriptionLevel,
    ) -> Result<Option<SubscriptionTier>, AppError> {
        let row: Option<SubscriptionTierRow> = sqlx::query_as::<Postgres, SubscriptionTierRow>(
            &format!("SELECT {TIER_COLUMNS} FROM subscription_tiers WHERE level = $1"),
        )
        .bind(level)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(SubscriptionTierRow::into_tier))
    }

    #[tracing::instrument(skip(self), fields(db.table = "subscription_tiers"))]
    pub async fn list(&self) -> Result<Vec<SubscriptionTier>, AppError> {
        let rows: Vec<SubscriptionTierRow> = sqlx::query_as::<Postgres, SubscriptionTierRow>(
            &format!("SELECT {TIER_COLUMNS} FROM subscription_tiers ORDER BY monthly_credits"),
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(SubscriptionTierRow::into_tier).collect())
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct ApiConfigurationRow {
    pub id: Uuid,
    pub key_name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

impl ApiConfigurationRow {
    fn into_config(self) -> ApiConfiguration {
        ApiConfiguration {
            id: self.id,
            key_name: self.key_name,
            description: self.description,
            is_active: self.is_active,
            updated_at: self.updated_at,
        }
    }
}

/// Repository for the api_configurations table of runtime flags.
#[derive(Clone)]
pub struct ApiConfigurationRepository {
    pool: PgPool,
}

impl ApiConfigurationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Whether a flag is active. A missing row reads as inactive.
    #[tracing::instrument(skip(self), fields(db.table = "api_configurations"))]
    pub async fn is_active(&self, key_name: &str) -> Result<bool, AppError> {
        let active: Option<bool> = sqlx::query_scalar(
            "SELECT is_active FROM api_configurations WHERE key_name = $1",
        )
        .bind(key_name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(active.unwrap_or(false))
    }

    #[tracing::instrument(skip(self), fields(db.table = "api_configurations"))]
    pub async fn list(&self) -> Result<Vec<ApiConfiguration>, AppError> {
        let rows: Vec<ApiConfigurationRow> = sqlx::query_as::<Postgres, ApiConfigurationRow>(
            "SELECT id, key_name, description, is_active, updated_at \
             FROM api_configurations ORDER BY key_name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(ApiConfigurationRow::into_config).collect())
    }

    /// Flip a flag, creating it if absent. Returns the stored row.
    #[tracing::instrument(skip(self), fields(db.table = "api_configurations"))]
    pub async fn set_active(
        &self,
        key_name: &str,
        is_active: bool,
    ) -> Result<ApiConfiguration, AppError> {
        let row: ApiConfigurationRow = sqlx::query_as::<Postgres, ApiConfigurationRow>(
            r#"
            INSERT INTO api_configurations (key_name, is_active)
            VALUES ($1, $2)
            ON CONFLICT (key_name)
            DO UPDATE SET is_active = EXCLUDED.is_active, updated_at = NOW()
            RETURNING id, key_name, description, is_active, updated_at
            "#,
        )
        .bind(key_name)
        .bind(is_active)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into_config())
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct ContentFilterWordRow {
    pub id: Uuid,
    pub word: String,
    pub category: String,
}

/// Repository for the content_filters word list.
#[derive(Clone)]
pub struct ContentFilterRepository {
    pool: PgPool,
}

impl ContentFilterRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All banned words, merged by callers with the built-in list.
    #[tracing::instrument(skip(self), fields(db.table = "content_filters"))]
    pub async fn list_words(&self) -> Result<Vec<String>, AppError> {
        let words: Vec<String> =
            sqlx::query_scalar("SELECT word FROM content_filters ORDER BY word")
                .fetch_all(&self.pool)
                .await?;
        Ok(words)
    }

    #[tracing::instrument(skip(self), fields(db.table = "content_filters"))]
    pub async fn list(&self) -> Result<Vec<ContentFilterWord>, AppError> {
        let rows: Vec<ContentFilterWordRow> = sqlx::query_as::<Postgres, ContentFilterWordRow>(
            "SELECT id, word, category FROM content_filters ORDER BY word",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| ContentFilterWord {
                id: r.id,
                word: r.word,
                category: r.category,
            })
            .collect())
    }
}
