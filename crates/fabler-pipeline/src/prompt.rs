//! Prompt construction for the generation providers.

use fabler_core::models::Story;

/// Character names longer than this are silently dropped from the prompt.
const MAX_CHARACTER_NAME_LEN: usize = 20;

/// What the user asked a story to be.
#[derive(Debug, Clone, Default)]
pub struct StoryPreferences {
    pub genre: String,
    pub age_group: String,
    pub moral: String,
    pub character_name1: Option<String>,
    pub character_name2: Option<String>,
    pub tone: Option<String>,
    pub reading_level: Option<String>,
    pub length_preference: Option<String>,
}

/// System prompt for story generation.
pub fn story_system_prompt() -> &'static str {
    "You are a skilled storyteller who creates engaging, age-appropriate stories with clear \
     moral lessons. Each story must be completely unique - never reuse character names, plot \
     elements, or titles from previous stories. Create fresh, original content every time. \
     Format the output with a Title at the start and a Moral at the end, without using any \
     asterisks or decorative characters."
}

/// User prompt for story generation, built from the request preferences.
pub fn story_user_prompt(preferences: &StoryPreferences) -> String {
    let character_names = [&preferences.character_name1, &preferences.character_name2]
        .into_iter()
        .flatten()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty() && name.len() <= MAX_CHARACTER_NAME_LEN)
        .collect::<Vec<_>>()
        .join(" and ");

    let character_prompt = if character_names.is_empty() {
        "Create appropriate character names for the story.".to_string()
    } else {
        format!(
            "Use the character names \"{}\" as the main characters in the story. Make sure \
             these characters play central roles in the narrative.",
            character_names
        )
    };

    format!(
        "Create a {} story for {} age group about {}. {} Format the story with a clear title \
         at the start and a moral lesson at the end. The story should be engaging and end with \
         a clear moral lesson. Keep it concise but meaningful. Do not use asterisks or other \
         decorative characters in the formatting.",
        preferences.genre, preferences.age_group, preferences.moral, character_prompt
    )
}

/// The scene description for a story's illustration: the stored image prompt
/// when present, otherwise derived from the story text.
pub fn illustration_scene(image_prompt: Option<&str>, content: &str) -> String {
    match image_prompt {
        Some(prompt) if !prompt.trim().is_empty() => prompt.to_string(),
        _ => format!("Create a storybook illustration for this story: {}", content),
    }
}

/// Wrap a scene description in the house illustration style.
pub fn enhance_illustration_prompt(scene: &str) -> String {
    format!(
        "Create a high-quality, detailed illustration suitable for a children's storybook. \
         Style: Use vibrant colors and a mix of 3D rendering and artistic illustration \
         techniques. The image should be engaging and magical, without any text overlays. \
         Focus on creating an emotional and immersive scene. Specific scene: {}. Important: \
         Do not include any text or words in the image.",
        scene
    )
}

/// System prompt for story translation: instructs the model to answer in the
/// labeled-section format [`crate::translation`] parses.
pub fn translation_system_prompt(target_language: &str) -> String {
    format!(
        "You are a professional translator. Translate the given story and its components to \
         {}, maintaining the original meaning, style, and emotional impact. Return the \
         translation in this format:\n\
         TITLE: [translated title]\n\
         STORY: [translated story content]\n\
         MORAL: [translated moral]\n\
         REFLECTION_QUESTIONS: [translated questions as JSON array]\n\
         ACTION_STEPS: [translated steps as JSON array]\n\
         RELATED_QUOTE: [translated quote]\n\
         DISCUSSION_PROMPTS: [translated prompts as JSON array]",
        target_language
    )
}

/// User prompt for story translation, labeling every component of the story.
pub fn translation_user_prompt(story: &Story, target_language: &str) -> String {
    format!(
        "Translate all components of this story to {}. Maintain the same tone, style, and \
         meaning for each part:\n\n\
         TITLE: {}\n\n\
         STORY: {}\n\n\
         MORAL: {}\n\n\
         REFLECTION_QUESTIONS: {}\n\n\
         ACTION_STEPS: {}\n\n\
         RELATED_QUOTE: {}\n\n\
         DISCUSSION_PROMPTS: {}",
        target_language,
        story.title,
        story.content,
        story.moral,
        serde_json::to_string(&story.reflection_questions).unwrap_or_else(|_| "[]".to_string()),
        serde_json::to_string(&story.action_steps).unwrap_or_else(|_| "[]".to_string()),
        story.related_quote.as_deref().unwrap_or(""),
        serde_json::to_string(&story.discussion_prompts).unwrap_or_else(|_| "[]".to_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_names_joined_with_and() {
        let preferences = StoryPreferences {
            genre: "fantasy".to_string(),
            age_group: "kids".to_string(),
            moral: "honesty".to_string(),
            character_name1: Some("Luna".to_string()),
            character_name2: Some("Milo".to_string()),
            ..Default::default()
        };
        let prompt = story_user_prompt(&preferences);
        assert!(prompt.contains("\"Luna and Milo\""));
    }

    #[test]
    fn test_overlong_character_name_dropped() {
        let preferences = StoryPreferences {
            genre: "fantasy".to_string(),
            age_group: "kids".to_string(),
            moral: "honesty".to_string(),
            character_name1: Some("A".repeat(21)),
            character_name2: Some("Milo".to_string()),
            ..Default::default()
        };
        let prompt = story_user_prompt(&preferences);
        assert!(prompt.contains("\"Milo\""));
        assert!(!prompt.contains(&"A".repeat(21)));
    }

    #[test]
    fn test_no_names_falls_back_to_generic_instruction() {
        let preferences = StoryPreferences {
            genre: "fable".to_string(),
            age_group: "teens".to_string(),
            moral: "patience".to_string(),
            character_name1: Some("   ".to_string()),
            ..Default::default()
        };
        let prompt = story_user_prompt(&preferences);
        assert!(prompt.contains("Create appropriate character names"));
    }

    #[test]
    fn test_illustration_scene_prefers_stored_prompt() {
        let scene = illustration_scene(Some("a fox under the moon"), "Once upon a time...");
        assert_eq!(scene, "a fox under the moon");

        let fallback = illustration_scene(None, "Once upon a time...");
        assert!(fallback.starts_with("Create a storybook illustration"));
        assert!(fallback.contains("Once upon a time..."));
    }

    #[test]
    fn test_enhanced_prompt_is_never_empty_and_embeds_scene() {
        let prompt = enhance_illustration_prompt("");
        assert!(!prompt.is_empty());

        let prompt = enhance_illustration_prompt("a dragon's tea party");
        assert!(prompt.contains("a dragon's tea party"));
        assert!(prompt.contains("Do not include any text"));
    }
}
