//! Repositories for generated media assets: narrated audio, videos,
//! illustrations, PDFs, and translation links.

use chrono::{DateTime, Utc};
use fabler_core::models::{
    AspectRatio, AudioAsset, ImageAsset, PdfAsset, ProcessingMethod, TranslationLink, VideoAsset,
};
use fabler_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
pub struct AudioAssetRow {
    pub id: Uuid,
    pub story_id: Uuid,
    pub user_id: Uuid,
    pub audio_url: String,
    pub voice_id: String,
    pub credits_used: i32,
    pub created_at: DateTime<Utc>,
}

impl AudioAssetRow {
    fn into_asset(self) -> AudioAsset {
        AudioAsset {
            id: self.id,
            story_id: self.story_id,
            user_id: self.user_id,
            audio_url: self.audio_url,
            voice_id: self.voice_id,
            credits_used: self.credits_used,
            created_at: self.created_at,
        }
    }
}

/// Repository for the audio_stories table.
#[derive(Clone)]
pub struct AudioAssetRepository {
    pool: PgPool,
}

impl AudioAssetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "audio_stories"))]
    pub async fn create(
        &self,
        story_id: Uuid,
        user_id: Uuid,
        audio_url: &str,
        voice_id: &str,
        credits_used: i32,
    ) -> Result<AudioAsset, AppError> {
        let row: AudioAssetRow = sqlx::query_as::<Postgres, AudioAssetRow>(
            r#"
            INSERT INTO audio_stories (story_id, user_id, audio_url, voice_id, credits_used)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, story_id, user_id, audio_url, voice_id, credits_used, created_at
            "#,
        )
        .bind(story_id)
        .bind(user_id)
        .bind(audio_url)
        .bind(voice_id)
        .bind(credits_used)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into_asset())
    }

    #[tracing::instrument(skip(self), fields(db.table = "audio_stories"))]
    pub async fn list_for_story(
        &self,
        story_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<AudioAsset>, AppError> {
        let rows: Vec<AudioAssetRow> = sqlx::query_as::<Postgres, AudioAssetRow>(
            r#"
            SELECT id, story_id, user_id, audio_url, voice_id, credits_used, created_at
            FROM audio_stories
            WHERE story_id = $1 AND user_id = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(story_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(AudioAssetRow::into_asset).collect())
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct VideoAssetRow {
    pub id: Uuid,
    pub story_id: Uuid,
    pub user_id: Uuid,
    pub video_url: String,
    pub aspect_ratio: AspectRatio,
    pub processing_method: Option<ProcessingMethod>,
    pub credits_used: i32,
    pub created_at: DateTime<Utc>,
}

impl VideoAssetRow {
    fn into_asset(self) -> VideoAsset {
        VideoAsset {
            id: self.id,
            story_id: self.story_id,
            user_id: self.user_id,
            video_url: self.video_url,
            aspect_ratio: self.aspect_ratio,
            processing_method: self.processing_method,
            credits_used: self.credits_used,
            created_at: self.created_at,
        }
    }
}

/// Repository for the story_videos table.
#[derive(Clone)]
pub struct VideoAssetRepository {
    pool: PgPool,
}

impl VideoAssetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "story_videos"))]
    pub async fn create(
        &self,
        story_id: Uuid,
        user_id: Uuid,
        video_url: &str,
        aspect_ratio: AspectRatio,
        processing_method: Option<ProcessingMethod>,
        credits_used: i32,
    ) -> Result<VideoAsset, AppError> {
        let row: VideoAssetRow = sqlx::query_as::<Postgres, VideoAssetRow>(
            r#"
            INSERT INTO story_videos
                (story_id, user_id, video_url, aspect_ratio, processing_method, credits_used)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, story_id, user_id, video_url, aspect_ratio, processing_method,
                      credits_used, created_at
            "#,
        )
        .bind(story_id)
        .bind(user_id)
        .bind(video_url)
        .bind(aspect_ratio)
        .bind(processing_method)
        .bind(credits_used)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into_asset())
    }

    #[tracing::instrument(skip(self), fields(db.table = "story_videos"))]
    pub async fn list_for_story(
        &self,
        story_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<VideoAsset>, AppError> {
        let rows: Vec<VideoAssetRow> = sqlx::query_as::<Postgres, VideoAssetRow>(
            r#"
            SELECT id, story_id, user_id, video_url, aspect_ratio, processing_method,
                   credits_used, created_at
            FROM story_videos
            WHERE story_id = $1 AND user_id = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(story_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(VideoAssetRow::into_asset).collect())
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct ImageAssetRow {
    pub id: Uuid,
    pub story_id: Uuid,
    pub user_id: Uuid,
    pub image_url: String,
    pub aspect_ratio: AspectRatio,
    pub credits_used: i32,
    pub created_at: DateTime<Utc>,
}

impl ImageAssetRow {
    fn into_asset(self) -> ImageAsset {
        ImageAsset {
            id: self.id,
            story_id: self.story_id,
            user_id: self.user_id,
            image_url: self.image_url,
            aspect_ratio: self.aspect_ratio,
            credits_used: self.credits_used,
            created_at: self.created_at,
        }
    }
}

/// Repository for the story_images table.
#[derive(Clone)]
pub struct ImageAssetRepository {
    pool: PgPool,
}

impl ImageAssetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "story_images"))]
    pub async fn create(
        &self,
        story_id: Uuid,
        user_id: Uuid,
        image_url: &str,
        aspect_ratio: AspectRatio,
        credits_used: i32,
    ) -> Result<ImageAsset, AppError> {
        let row: ImageAssetRow = sqlx::query_as::<Postgres, ImageAssetRow>(
            r#"
            INSERT INTO story_images (story_id, user_id, image_url, aspect_ratio, credits_used)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, story_id, user_id, image_url, aspect_ratio, credits_used, created_at
            "#,
        )
        .bind(story_id)
        .bind(user_id)
        .bind(image_url)
        .bind(aspect_ratio)
        .bind(credits_used)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into_asset())
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct PdfAssetRow {
    pub id: Uuid,
    pub story_id: Uuid,
    pub user_id: Uuid,
    pub pdf_url: String,
    pub credits_used: i32,
    pub created_at: DateTime<Utc>,
}

impl PdfAssetRow {
    fn into_asset(self) -> PdfAsset {
        PdfAsset {
            id: self.id,
            story_id: self.story_id,
            user_id: self.user_id,
            pdf_url: self.pdf_url,
            credits_used: self.credits_used,
            created_at: self.created_at,
        }
    }
}

/// Repository for the story_pdfs table.
#[derive(Clone)]
pub struct PdfAssetRepository {
    pool: PgPool,
}

impl PdfAssetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "story_pdfs"))]
    pub async fn create(
        &self,
        story_id: Uuid,
        user_id: Uuid,
        pdf_url: &str,
        credits_used: i32,
    ) -> Result<PdfAsset, AppError> {
        let row: PdfAssetRow = sqlx::query_as::<Postgres, PdfAssetRow>(
            r#"
            INSERT INTO story_pdfs (story_id, user_id, pdf_url, credits_used)
            VALUES ($1, $2, $3, $4)
            RETURNING id, story_id, user_id, pdf_url, credits_used, created_at
            "#,
        )
        .bind(story_id)
        .bind(user_id)
        .bind(pdf_url)
        .bind(credits_used)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into_asset())
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct TranslationLinkRow {
    pub id: Uuid,
    pub original_story_id: Uuid,
    pub translated_story_id: Uuid,
    pub language: String,
    pub user_id: Uuid,
    pub credits_used: i32,
    pub created_at: DateTime<Utc>,
}

impl TranslationLinkRow {
    fn into_link(self) -> TranslationLink {
        TranslationLink {
            id: self.id,
            original_story_id: self.original_story_id,
            translated_story_id: self.translated_story_id,
            language: self.language,
            user_id: self.user_id,
            credits_used: self.credits_used,
            created_at: self.created_at,
        }
    }
}

/// Repository for the story_translations table.
#[derive(Clone)]
pub struct TranslationRepository {
    pool: PgPool,
}

impl TranslationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "story_translations"))]
    pub async fn create(
        &self,
        original_story_id: Uuid,
        translated_story_id: Uuid,
        language: &str,
        user_id: Uuid,
        credits_used: i32,
    ) -> Result<TranslationLink, AppError> {
        let row: TranslationLinkRow = sqlx::query_as::<Postgres, TranslationLinkRow>(
            r#"
            INSERT INTO story_translations
                (original_story_id, translated_story_id, language, user_id, credits_used)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, original_story_id, translated_story_id, language, user_id,
                      credits_used, created_at
            "#,
        )
        .bind(original_story_id)
        .bind(translated_story_id)
        .bind(language)
        .bind(user_id)
        .bind(credits_used)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into_link())
    }

    #[tracing::instrument(skip(self), fields(db.table = "story_translations"))]
    pub async fn list_for_story(
        &self,
        original_story_id: Uuid,
    ) -> Result<Vec<TranslationLink>, AppError> {
        let rows: Vec<TranslationLinkRow> = sqlx::query_as::<Postgres, TranslationLinkRow>(
            r#"
            SELECT id, original_story_id, translated_story_id, language, user_id,
                   credits_used, created_at
            FROM story_translations
            WHERE original_story_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(original_story_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(TranslationLinkRow::into_link).collect())
    }
}
