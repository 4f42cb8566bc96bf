use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;
use uuid::Uuid;

/// Supported video/image aspect ratios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "video_aspect_ratio"))]
pub enum AspectRatio {
    #[serde(rename = "16:9")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "16:9"))]
    Landscape,
    #[serde(rename = "9:16")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "9:16"))]
    Portrait,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "9:16",
        }
    }

    /// Pixel dimensions used by the image generation providers.
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            AspectRatio::Landscape => (1024, 576),
            AspectRatio::Portrait => (576, 1024),
        }
    }
}

impl Display for AspectRatio {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// Which native tool produced a video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "video_processing_method", rename_all = "lowercase")
)]
pub enum ProcessingMethod {
    Ffmpeg,
    Moviepy,
}

/// A narrated rendering of a story.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AudioAsset {
    pub id: Uuid,
    pub story_id: Uuid,
    pub user_id: Uuid,
    pub audio_url: String,
    pub voice_id: String,
    pub credits_used: i32,
    pub created_at: DateTime<Utc>,
}

/// A video rendering of a story, produced by the video orchestration flow.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VideoAsset {
    pub id: Uuid,
    pub story_id: Uuid,
    pub user_id: Uuid,
    pub video_url: String,
    pub aspect_ratio: AspectRatio,
    pub processing_method: Option<ProcessingMethod>,
    pub credits_used: i32,
    pub created_at: DateTime<Utc>,
}

/// An illustration generated for a story.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImageAsset {
    pub id: Uuid,
    pub story_id: Uuid,
    pub user_id: Uuid,
    pub image_url: String,
    pub aspect_ratio: AspectRatio,
    pub credits_used: i32,
    pub created_at: DateTime<Utc>,
}

/// A client-rendered PDF of a story, recorded for the user's library.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PdfAsset {
    pub id: Uuid,
    pub story_id: Uuid,
    pub user_id: Uuid,
    pub pdf_url: String,
    pub credits_used: i32,
    pub created_at: DateTime<Utc>,
}

/// Links a translated story back to its original.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TranslationLink {
    pub id: Uuid,
    pub original_story_id: Uuid,
    pub translated_story_id: Uuid,
    pub language: String,
    pub user_id: Uuid,
    pub credits_used: i32,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio_dimensions() {
        assert_eq!(AspectRatio::Landscape.dimensions(), (1024, 576));
        assert_eq!(AspectRatio::Portrait.dimensions(), (576, 1024));
    }

    #[test]
    fn test_aspect_ratio_serde_uses_wire_format() {
        let json = serde_json::to_string(&AspectRatio::Landscape).unwrap();
        assert_eq!(json, "\"16:9\"");
        let parsed: AspectRatio = serde_json::from_str("\"9:16\"").unwrap();
        assert_eq!(parsed, AspectRatio::Portrait);
    }
}
