//! Object storage abstraction for media buckets.
//!
//! Media is partitioned into named buckets per type (`story-audio`,
//! `story-images`, `story-videos`). Backends implement the [`Storage`] trait;
//! the local filesystem backend is the default, S3 is feature-gated behind
//! `storage-s3`.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

pub use factory::create_storage;
pub use keys::{STORY_AUDIO_BUCKET, STORY_IMAGES_BUCKET, STORY_VIDEOS_BUCKET};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
