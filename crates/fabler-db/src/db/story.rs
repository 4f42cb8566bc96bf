//! Story repository: CRUD and favorites for the stories tables.

use chrono::{DateTime, Utc};
use fabler_core::models::Story;
use fabler_core::AppError;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// Row type for the stories table (for FromRow). Enrichment arrays are stored
/// as jsonb.
#[derive(Debug, sqlx::FromRow)]
pub struct StoryRow {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub moral: String,
    pub slug: String,
    pub age_group: String,
    pub genre: String,
    pub language: Option<String>,
    pub tone: Option<String>,
    pub reading_level: Option<String>,
    pub length_preference: Option<String>,
    pub image_prompt: Option<String>,
    pub reflection_questions: Json<Vec<String>>,
    pub action_steps: Json<Vec<String>>,
    pub related_quote: Option<String>,
    pub discussion_prompts: Json<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoryRow {
    pub fn into_story(self) -> Story {
        Story {
            id: self.id,
            author_id: self.author_id,
            title: self.title,
            content: self.content,
            moral: self.moral,
            slug: self.slug,
            age_group: self.age_group,
            genre: self.genre,
            language: self.language,
            tone: self.tone,
            reading_level: self.reading_level,
            length_preference: self.length_preference,
            image_prompt: self.image_prompt,
            reflection_questions: self.reflection_questions.0,
            action_steps: self.action_steps.0,
            related_quote: self.related_quote,
            discussion_prompts: self.discussion_prompts.0,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const STORY_COLUMNS: &str = "id, author_id, title, content, moral, slug, age_group, genre, \
     language, tone, reading_level, length_preference, image_prompt, \
     reflection_questions, action_steps, related_quote, discussion_prompts, \
     created_at, updated_at";

/// Fields accepted when inserting a story. The id and timestamps come from
/// the database.
#[derive(Debug, Clone)]
pub struct NewStory {
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub moral: String,
    pub slug: String,
    pub age_group: String,
    pub genre: String,
    pub language: Option<String>,
    pub tone: Option<String>,
    pub reading_level: Option<String>,
    pub length_preference: Option<String>,
    pub image_prompt: Option<String>,
    pub reflection_questions: Vec<String>,
    pub action_steps: Vec<String>,
    pub related_quote: Option<String>,
    pub discussion_prompts: Vec<String>,
}

/// Fields a story owner may edit.
#[derive(Debug, Clone)]
pub struct StoryUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub moral: Option<String>,
    pub image_prompt: Option<String>,
}

/// Repository for the stories and story_favorites tables.
#[derive(Clone)]
pub struct StoryRepository {
    pool: PgPool,
}

impl StoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new story and return it.
    #[tracing::instrument(skip(self, story), fields(db.table = "stories"))]
    pub async fn create(&self, story: NewStory) -> Result<Story, AppError> {
        let row: StoryRow = sqlx::query_as::<Postgres, StoryRow>(&format!(
            r#"
            INSERT INTO stories (
                author_id, title, content, moral, slug, age_group, genre,
                language, tone, reading_level, length_preference, image_prompt,
                reflection_questions, action_steps, related_quote, discussion_prompts
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {STORY_COLUMNS}
            "#,
        ))
        .bind(story.author_id)
        .bind(&story.title)
        .bind(&story.content)
        .bind(&story.moral)
        .bind(&story.slug)
        .bind(&story.age_group)
        .bind(&story.genre)
        .bind(&story.language)
        .bind(&story.tone)
        .bind(&story.reading_level)
        .bind(&story.length_preference)
        .bind(&story.image_prompt)
        .bind(Json(&story.reflection_questions))
        .bind(Json(&story.action_steps))
        .bind(&story.related_quote)
        .bind(Json(&story.discussion_prompts))
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into_story())
    }

    /// Fetch a story by id.
    #[tracing::instrument(skip(self), fields(db.table = "stories", db.record_id = %id))]
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Story>, AppError> {
        let row: Option<StoryRow> = sqlx::query_as::<Postgres, StoryRow>(&format!(
            "SELECT {STORY_COLUMNS} FROM stories WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(StoryRow::into_story))
    }

    /// Fetch a story by id, requiring the caller to be its author.
    #[tracing::instrument(skip(self), fields(db.table = "stories", db.record_id = %id))]
    pub async fn get_owned(&self, id: Uuid, author_id: Uuid) -> Result<Option<Story>, AppError> {
        let row: Option<StoryRow> = sqlx::query_as::<Postgres, StoryRow>(&format!(
            "SELECT {STORY_COLUMNS} FROM stories WHERE id = $1 AND author_id = $2",
        ))
        .bind(id)
        .bind(author_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(StoryRow::into_story))
    }

    /// List an author's stories, newest first.
    #[tracing::instrument(skip(self), fields(db.table = "stories"))]
    pub async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<Story>, AppError> {
        let rows: Vec<StoryRow> = sqlx::query_as::<Postgres, StoryRow>(&format!(
            "SELECT {STORY_COLUMNS} FROM stories WHERE author_id = $1 ORDER BY created_at DESC",
        ))
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(StoryRow::into_story).collect())
    }

    /// Count an author's saved stories, for tier limit enforcement.
    #[tracing::instrument(skip(self), fields(db.table = "stories"))]
    pub async fn count_by_author(&self, author_id: Uuid) -> Result<i64, AppError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM stories WHERE author_id = $1")
                .bind(author_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Apply an owner's edits. Returns the updated story, or None if the story
    /// does not exist or belongs to someone else.
    #[tracing::instrument(skip(self, update), fields(db.table = "stories", db.record_id = %id))]
    pub async fn update(
        &self,
        id: Uuid,
        author_id: Uuid,
        update: StoryUpdate,
    ) -> Result<Option<Story>, AppError> {
        let row: Option<StoryRow> = sqlx::query_as::<Postgres, StoryRow>(&format!(
            r#"
            UPDATE stories SET
                title = COALESCE($3, title),
                content = COALESCE($4, content),
                moral = COALESCE($5, moral),
                image_prompt = COALESCE($6, image_prompt),
                updated_at = NOW()
            WHERE id = $1 AND author_id = $2
            RETURNING {STORY_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(author_id)
        .bind(&update.title)
        .bind(&update.content)
        .bind(&update.moral)
        .bind(&update.image_prompt)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(StoryRow::into_story))
    }

    /// Delete a story owned by the caller. Returns true if a row was removed.
    #[tracing::instrument(skip(self), fields(db.table = "stories", db.record_id = %id))]
    pub async fn delete(&self, id: Uuid, author_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM stories WHERE id = $1 AND author_id = $2")
            .bind(id)
            .bind(author_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark a story as a favorite. Idempotent.
    #[tracing::instrument(skip(self), fields(db.table = "story_favorites"))]
    pub async fn add_favorite(&self, user_id: Uuid, story_id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO story_favorites (user_id, story_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, story_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(story_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Remove a favorite. Returns true if a row was removed.
    #[tracing::instrument(skip(self), fields(db.table = "story_favorites"))]
    pub async fn remove_favorite(&self, user_id: Uuid, story_id: Uuid) -> Result<bool, AppError> {
        let result =
            sqlx::query("DELETE FROM story_favorites WHERE user_id = $1 AND story_id = $2")
                .bind(user_id)
                .bind(story_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List a user's favorite stories, most recently favorited first.
    #[tracing::instrument(skip(self), fields(db.table = "story_favorites"))]
    pub async fn list_favorites(&self, user_id: Uuid) -> Result<Vec<Story>, AppError> {
        let rows: Vec<StoryRow> = sqlx::query_as::<Postgres, StoryRow>(&format!(
            r#"
            SELECT {}
            FROM stories s
            JOIN story_favorites f ON f.story_id = s.id
            WHERE f.user_id = $1
            ORDER BY f.created_at DESC
            "#,
            STORY_COLUMNS
                .split(", ")
                .map(|c| format!("s.{}", c))
                .collect::<Vec<_>>()
                .join(", "),
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(StoryRow::into_story).collect())
    }
}
