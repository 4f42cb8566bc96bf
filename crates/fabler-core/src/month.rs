//! Calendar-month keys for the credit ledger.
//!
//! Ledger rows are keyed by `(user_id, month_year)` where `month_year` is a
//! `YYYY-MM` string. At most one row exists per user per month.

use std::fmt::{Display, Formatter, Result as FmtResult};

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// A `YYYY-MM` calendar month key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthKey(String);

impl MonthKey {
    /// The key for the current UTC month.
    pub fn current() -> Self {
        Self::from_datetime(Utc::now())
    }

    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        MonthKey(format!("{:04}-{:02}", at.year(), at.month()))
    }

    /// Parse a `YYYY-MM` string, rejecting anything else.
    pub fn parse(value: &str) -> Option<Self> {
        let (year, month) = value.split_once('-')?;
        if year.len() != 4 || month.len() != 2 {
            return None;
        }
        year.parse::<u16>().ok()?;
        let m: u8 = month.parse().ok()?;
        if !(1..=12).contains(&m) {
            return None;
        }
        Some(MonthKey(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for MonthKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_from_datetime_zero_pads_month() {
        let march = Utc.with_ymd_and_hms(2025, 3, 31, 23, 59, 59).unwrap();
        assert_eq!(MonthKey::from_datetime(march).as_str(), "2025-03");
    }

    #[test]
    fn test_parse_accepts_valid_keys() {
        assert_eq!(MonthKey::parse("2025-12").unwrap().as_str(), "2025-12");
        assert_eq!(MonthKey::parse("1999-01").unwrap().as_str(), "1999-01");
    }

    #[test]
    fn test_parse_rejects_malformed_keys() {
        assert!(MonthKey::parse("2025-13").is_none());
        assert!(MonthKey::parse("2025-0").is_none());
        assert!(MonthKey::parse("25-01").is_none());
        assert!(MonthKey::parse("2025/01").is_none());
        assert!(MonthKey::parse("").is_none());
    }
}
