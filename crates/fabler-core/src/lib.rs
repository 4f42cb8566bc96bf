//! Core types for the Fabler story generation service.
//!
//! This crate holds what every other crate needs: the unified [`AppError`]
//! taxonomy, environment-driven [`Config`], the domain models, and small value
//! types (month keys for the credit ledger, the content safety filter).

pub mod config;
pub mod error;
pub mod models;
pub mod month;
pub mod safety;

pub use config::{Config, StorageBackendKind};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use month::MonthKey;
pub use safety::ContentSafetyFilter;
