//! Bucket names and key generation for media objects.
//!
//! Temporary objects created mid-pipeline use `temp_{uuid}.{ext}` keys so they
//! are recognizable in the bucket if a best-effort cleanup ever misses one.

use uuid::Uuid;

/// Bucket for narrated story audio.
pub const STORY_AUDIO_BUCKET: &str = "story-audio";
/// Bucket for generated story illustrations.
pub const STORY_IMAGES_BUCKET: &str = "story-images";
/// Bucket for finished videos and their transient inputs.
pub const STORY_VIDEOS_BUCKET: &str = "story-videos";

/// Generate a collision-resistant key for a temporary pipeline object.
pub fn temp_object_key(extension: &str) -> String {
    format!("temp_{}.{}", Uuid::new_v4(), extension)
}

/// Generate the key for a finished video object.
pub fn video_output_key() -> String {
    format!("{}.mp4", Uuid::new_v4())
}

/// Generate the key for a narrated audio object.
pub fn audio_object_key() -> String {
    format!("{}.mp3", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_keys_are_unique_and_prefixed() {
        let a = temp_object_key("png");
        let b = temp_object_key("png");
        assert_ne!(a, b);
        assert!(a.starts_with("temp_"));
        assert!(a.ends_with(".png"));
    }

    #[test]
    fn test_output_keys_carry_extension_only() {
        let key = video_output_key();
        assert!(key.ends_with(".mp4"));
        assert!(!key.starts_with("temp_"));
    }
}
