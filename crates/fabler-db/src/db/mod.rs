//! Database repositories for data access layer
//!
//! Repositories are organized by domain: stories and favorites, generated
//! media assets, the monthly credit ledger, and account data (profiles,
//! subscription tiers, runtime configuration flags, content filter words).

pub mod account;
pub mod assets;
pub mod credits;
pub mod story;
