//! Monthly credit ledger.
//!
//! One row per (user, month). All spending goes through a single atomic
//! increment so concurrent generation requests can never lose an update;
//! callers must not read-modify-write the counter themselves.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fabler_core::models::CreditLedgerEntry;
use fabler_core::{AppError, MonthKey};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// The ledger as services see it. Backed by Postgres in production; tests use
/// an in-memory implementation.
#[async_trait]
pub trait CreditLedger: Send + Sync {
    /// Atomically add `amount` credits to the user's counter for the given
    /// month, creating the row if absent. Returns the new total.
    async fn add_credits(
        &self,
        user_id: Uuid,
        month: &MonthKey,
        amount: i32,
    ) -> Result<i32, AppError>;

    /// Current usage for a month; 0 if no row exists yet.
    async fn usage(&self, user_id: Uuid, month: &MonthKey) -> Result<i32, AppError>;
}

#[derive(Debug, sqlx::FromRow)]
struct LedgerRow {
    id: Uuid,
    user_id: Uuid,
    month_year: String,
    credits_used: i32,
    updated_at: DateTime<Utc>,
}

impl LedgerRow {
    fn into_entry(self) -> Result<CreditLedgerEntry, AppError> {
        Ok(CreditLedgerEntry {
            id: self.id,
            user_id: self.user_id,
            month_year: MonthKey::parse(&self.month_year).ok_or_else(|| {
                AppError::Ledger(format!("Malformed month key in ledger row: {}", self.month_year))
            })?,
            credits_used: self.credits_used,
            updated_at: self.updated_at,
        })
    }
}

/// Postgres-backed ledger over the user_story_counts table.
#[derive(Clone)]
pub struct PgCreditLedger {
    pool: PgPool,
}

impl PgCreditLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Full ledger entry for a month, if the user has spent anything.
    #[tracing::instrument(skip(self), fields(db.table = "user_story_counts"))]
    pub async fn entry(
        &self,
        user_id: Uuid,
        month: &MonthKey,
    ) -> Result<Option<CreditLedgerEntry>, AppError> {
        let row: Option<LedgerRow> = sqlx::query_as::<Postgres, LedgerRow>(
            r#"
            SELECT id, user_id, month_year, credits_used, updated_at
            FROM user_story_counts
            WHERE user_id = $1 AND month_year = $2
            "#,
        )
        .bind(user_id)
        .bind(month.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(LedgerRow::into_entry).transpose()
    }
}

#[async_trait]
impl CreditLedger for PgCreditLedger {
    #[tracing::instrument(skip(self), fields(db.table = "user_story_counts"))]
    async fn add_credits(
        &self,
        user_id: Uuid,
        month: &MonthKey,
        amount: i32,
    ) -> Result<i32, AppError> {
        if amount < 0 {
            return Err(AppError::Ledger(
                "Credit increments must be non-negative".to_string(),
            ));
        }
        let total: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO user_story_counts (user_id, month_year, credits_used)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, month_year)
            DO UPDATE SET
                credits_used = user_story_counts.credits_used + EXCLUDED.credits_used,
                updated_at = NOW()
            RETURNING credits_used
            "#,
        )
        .bind(user_id)
        .bind(month.as_str())
        .bind(amount)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    #[tracing::instrument(skip(self), fields(db.table = "user_story_counts"))]
    async fn usage(&self, user_id: Uuid, month: &MonthKey) -> Result<i32, AppError> {
        let used: Option<i32> = sqlx::query_scalar(
            r#"
            SELECT credits_used FROM user_story_counts
            WHERE user_id = $1 AND month_year = $2
            "#,
        )
        .bind(user_id)
        .bind(month.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(used.unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    /// In-memory ledger with the same increment semantics as the Postgres
    /// upsert: a single guarded add, never read-then-write across awaits.
    struct InMemoryCreditLedger {
        entries: Mutex<HashMap<(Uuid, String), i32>>,
    }

    impl InMemoryCreditLedger {
        fn new() -> Self {
            Self {
                entries: Mutex::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl CreditLedger for InMemoryCreditLedger {
        async fn add_credits(
            &self,
            user_id: Uuid,
            month: &MonthKey,
            amount: i32,
        ) -> Result<i32, AppError> {
            if amount < 0 {
                return Err(AppError::Ledger(
                    "Credit increments must be non-negative".to_string(),
                ));
            }
            let mut entries = self.entries.lock().await;
            let total = entries
                .entry((user_id, month.as_str().to_string()))
                .or_insert(0);
            *total += amount;
            Ok(*total)
        }

        async fn usage(&self, user_id: Uuid, month: &MonthKey) -> Result<i32, AppError> {
            let entries = self.entries.lock().await;
            Ok(entries
                .get(&(user_id, month.as_str().to_string()))
                .copied()
                .unwrap_or(0))
        }
    }

    #[tokio::test]
    async fn test_concurrent_increments_all_land() {
        let ledger = Arc::new(InMemoryCreditLedger::new());
        let user_id = Uuid::new_v4();
        let month = MonthKey::parse("2026-08").unwrap();

        let mut handles = Vec::new();
        for _ in 0..50 {
            let ledger = Arc::clone(&ledger);
            let month = month.clone();
            handles.push(tokio::spawn(async move {
                ledger.add_credits(user_id, &month, 1).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(ledger.usage(user_id, &month).await.unwrap(), 50);
    }

    #[tokio::test]
    async fn test_usage_defaults_to_zero() {
        let ledger = InMemoryCreditLedger::new();
        let month = MonthKey::parse("2026-01").unwrap();
        assert_eq!(ledger.usage(Uuid::new_v4(), &month).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_negative_increment_rejected() {
        let ledger = InMemoryCreditLedger::new();
        let month = MonthKey::parse("2026-01").unwrap();
        let err = ledger
            .add_credits(Uuid::new_v4(), &month, -3)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Ledger(_)));
    }

    #[tokio::test]
    async fn test_months_are_independent() {
        let ledger = InMemoryCreditLedger::new();
        let user_id = Uuid::new_v4();
        let july = MonthKey::parse("2026-07").unwrap();
        let august = MonthKey::parse("2026-08").unwrap();

        ledger.add_credits(user_id, &july, 2).await.unwrap();
        ledger.add_credits(user_id, &august, 5).await.unwrap();

        assert_eq!(ledger.usage(user_id, &july).await.unwrap(), 2);
        assert_eq!(ledger.usage(user_id, &august).await.unwrap(), 5);
    }
}
