use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::MonthKey;

/// One ledger row per (user, calendar month) tracking cumulative credits
/// consumed. Mutated only through the atomic increment in the ledger
/// repository; never read-modify-written from application code.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreditLedgerEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    #[schema(value_type = String, example = "2026-08")]
    pub month_year: MonthKey,
    pub credits_used: i32,
    pub updated_at: DateTime<Utc>,
}
