pub mod account;
pub mod assets;
pub mod credits;
pub mod story;

pub use account::{
    ApiConfiguration, ContentFilterWord, Profile, SubscriptionLevel, SubscriptionTier,
};
pub use assets::{
    AspectRatio, AudioAsset, ImageAsset, PdfAsset, ProcessingMethod, TranslationLink, VideoAsset,
};
pub use credits::CreditLedgerEntry;
pub use story::{slug_from_title, Story, StoryResponse};
