use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A generated story and its enrichment content.
///
/// Stories are immutable once created except for explicit edits/deletes by the
/// owner. Enrichment fields (reflection questions, action steps, discussion
/// prompts) are JSON arrays in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Story {
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
    pub reflection_questions: Vec<String>,
    pub action_steps: Vec<String>,
    pub related_quote: Option<String>,
    pub discussion_prompts: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Story representation in API responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StoryResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub moral: String,
    pub slug: String,
    pub age_group: String,
    pub genre: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reading_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_prompt: Option<String>,
    pub reflection_questions: Vec<String>,
    pub action_steps: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_quote: Option<String>,
    pub discussion_prompts: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Story> for StoryResponse {
    fn from(story: Story) -> Self {
        StoryResponse {
            id: story.id,
            title: story.title,
            content: story.content,
            moral: story.moral,
            slug: story.slug,
            age_group: story.age_group,
            genre: story.genre,
            language: story.language,
            tone: story.tone,
            reading_level: story.reading_level,
            image_prompt: story.image_prompt,
            reflection_questions: story.reflection_questions,
            action_steps: story.action_steps,
            related_quote: story.related_quote,
            discussion_prompts: story.discussion_prompts,
            created_at: story.created_at,
        }
    }
}

/// Derive a URL slug from a story title: lowercase, alphanumeric runs joined
/// by single hyphens.
pub fn slug_from_title(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_hyphen = true;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }
    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_from_title() {
        assert_eq!(slug_from_title("The Brave Little Fox"), "the-brave-little-fox");
        assert_eq!(slug_from_title("  Hello,   World!  "), "hello-world");
        assert_eq!(slug_from_title("???"), "untitled");
    }
}
