//! Database access layer.
//!
//! One repository per table group, each holding a `PgPool` clone. Repositories
//! return domain types from `fabler-core` and surface failures as
//! [`fabler_core::AppError`].

pub mod db;

pub use db::{
    account::{
        ApiConfigurationRepository, ContentFilterRepository, ProfileRepository,
        SubscriptionTierRepository,
    },
    assets::{
        AudioAssetRepository, ImageAssetRepository, PdfAssetRepository, TranslationRepository,
        VideoAssetRepository,
    },
    credits::{CreditLedger, PgCreditLedger},
    story::{NewStory, StoryRepository, StoryUpdate},
};
