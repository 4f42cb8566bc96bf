//! Parsing model output for story translation.
//!
//! The translator model is asked to answer with labeled sections
//! (TITLE:/STORY:/MORAL:/...). Sections are matched case-insensitively with a
//! lookahead to the next marker; an array section that is missing or holds
//! malformed JSON falls back to the original story's content rather than
//! failing the whole translation.

use std::sync::OnceLock;

use fabler_core::models::Story;
use regex::Regex;

/// The translated components of a story, ready to insert as a new story row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedStory {
    pub title: String,
    pub content: String,
    pub moral: String,
    pub reflection_questions: Vec<String>,
    pub action_steps: Vec<String>,
    pub related_quote: String,
    pub discussion_prompts: Vec<String>,
}

struct SectionPatterns {
    title: Regex,
    story: Regex,
    moral: Regex,
    reflection: Regex,
    action_steps: Regex,
    quote: Regex,
    discussion: Regex,
}

fn patterns() -> &'static SectionPatterns {
    static PATTERNS: OnceLock<SectionPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| SectionPatterns {
        title: Regex::new(r"(?i)TITLE:\s*(.*)").unwrap(),
        story: Regex::new(r"(?is)STORY:\s*(.*?)(?:MORAL:)").unwrap(),
        moral: Regex::new(r"(?is)MORAL:\s*(.*?)(?:REFLECTION_QUESTIONS:)").unwrap(),
        reflection: Regex::new(r"(?is)REFLECTION_QUESTIONS:\s*(.*?)(?:ACTION_STEPS:)").unwrap(),
        action_steps: Regex::new(r"(?is)ACTION_STEPS:\s*(.*?)(?:RELATED_QUOTE:)").unwrap(),
        quote: Regex::new(r"(?is)RELATED_QUOTE:\s*(.*?)(?:DISCUSSION_PROMPTS:)").unwrap(),
        discussion: Regex::new(r"(?is)DISCUSSION_PROMPTS:\s*(.*)$").unwrap(),
    })
}

fn section<'a>(pattern: &Regex, text: &'a str) -> Option<&'a str> {
    pattern
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
}

fn json_array_or(section_text: Option<&str>, original: &[String]) -> Vec<String> {
    let Some(text) = section_text else {
        return original.to_vec();
    };
    match serde_json::from_str::<Vec<String>>(text) {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(error = %e, "Malformed JSON array in translation, keeping original");
            original.to_vec()
        }
    }
}

impl TranslatedStory {
    /// Parse labeled translator output. Each part degrades independently:
    /// a missing title falls back to "{original} ({language})", missing or
    /// malformed JSON arrays fall back to the original story's arrays, and
    /// missing text sections fall back to empty.
    pub fn parse(text: &str, original: &Story, target_language: &str) -> Self {
        let p = patterns();

        let title = section(&p.title, text)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} ({})", original.title, target_language));

        TranslatedStory {
            title,
            content: section(&p.story, text).unwrap_or("").to_string(),
            moral: section(&p.moral, text).unwrap_or("").to_string(),
            reflection_questions: json_array_or(
                section(&p.reflection, text),
                &original.reflection_questions,
            ),
            action_steps: json_array_or(section(&p.action_steps, text), &original.action_steps),
            related_quote: section(&p.quote, text).unwrap_or("").to_string(),
            discussion_prompts: json_array_or(
                section(&p.discussion, text),
                &original.discussion_prompts,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn original() -> Story {
        Story {
            id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            title: "The Brave Fox".to_string(),
            content: "Once upon a time...".to_string(),
            moral: "Courage matters.".to_string(),
            slug: "the-brave-fox".to_string(),
            age_group: "kids".to_string(),
            genre: "fable".to_string(),
            language: None,
            tone: None,
            reading_level: None,
            length_preference: None,
            image_prompt: None,
            reflection_questions: vec!["What would you do?".to_string()],
            action_steps: vec!["Practice courage.".to_string()],
            related_quote: Some("Fortune favors the bold.".to_string()),
            discussion_prompts: vec!["Discuss bravery.".to_string()],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_well_formed_output_parses_every_section() {
        let text = concat!(
            "TITLE: El Zorro Valiente\n",
            "STORY: Érase una vez...\n",
            "MORAL: El coraje importa.\n",
            "REFLECTION_QUESTIONS: [\"¿Qué harías tú?\"]\n",
            "ACTION_STEPS: [\"Practica el coraje.\"]\n",
            "RELATED_QUOTE: La fortuna favorece a los valientes.\n",
            "DISCUSSION_PROMPTS: [\"Habla sobre la valentía.\"]",
        );
        let translated = TranslatedStory::parse(text, &original(), "Spanish");

        assert_eq!(translated.title, "El Zorro Valiente");
        assert_eq!(translated.content, "Érase una vez...");
        assert_eq!(translated.moral, "El coraje importa.");
        assert_eq!(translated.reflection_questions, vec!["¿Qué harías tú?"]);
        assert_eq!(translated.action_steps, vec!["Practica el coraje."]);
        assert_eq!(
            translated.related_quote,
            "La fortuna favorece a los valientes."
        );
        assert_eq!(translated.discussion_prompts, vec!["Habla sobre la valentía."]);
    }

    #[test]
    fn test_missing_title_falls_back_to_original_with_language() {
        let text = "STORY: Érase una vez...\nMORAL: El coraje.\nREFLECTION_QUESTIONS: []\nACTION_STEPS: []\nRELATED_QUOTE: x\nDISCUSSION_PROMPTS: []";
        let translated = TranslatedStory::parse(text, &original(), "Spanish");
        assert_eq!(translated.title, "The Brave Fox (Spanish)");
    }

    #[test]
    fn test_malformed_json_array_keeps_original() {
        let text = concat!(
            "TITLE: T\n",
            "STORY: S\n",
            "MORAL: M\n",
            "REFLECTION_QUESTIONS: not json at all\n",
            "ACTION_STEPS: [\"ok\"]\n",
            "RELATED_QUOTE: Q\n",
            "DISCUSSION_PROMPTS: [\"ok too\"]",
        );
        let translated = TranslatedStory::parse(text, &original(), "French");
        assert_eq!(
            translated.reflection_questions,
            vec!["What would you do?"]
        );
        assert_eq!(translated.action_steps, vec!["ok"]);
    }

    #[test]
    fn test_markers_match_case_insensitively() {
        let text = "title: Le Renard\nstory: Il était une fois...\nmoral: Le courage.\nreflection_questions: []\naction_steps: []\nrelated_quote: q\ndiscussion_prompts: []";
        let translated = TranslatedStory::parse(text, &original(), "French");
        assert_eq!(translated.title, "Le Renard");
        assert_eq!(translated.content, "Il était une fois...");
    }

    #[test]
    fn test_missing_array_marker_keeps_original_array() {
        // No ACTION_STEPS marker at all. The original's steps must survive;
        // an absent section is not the same as a translated-to-empty one.
        let text = concat!(
            "TITLE: Der Tapfere Fuchs\n",
            "STORY: Es war einmal...\n",
            "MORAL: Mut zählt.\n",
            "REFLECTION_QUESTIONS: [\"Was würdest du tun?\"]\n",
            "RELATED_QUOTE: Das Glück bevorzugt die Mutigen.\n",
            "DISCUSSION_PROMPTS: [\"Sprecht über Mut.\"]",
        );
        let translated = TranslatedStory::parse(text, &original(), "German");
        assert_eq!(translated.action_steps, vec!["Practice courage."]);
        // The reflection section only terminates at an ACTION_STEPS marker,
        // so it fails to match here too and keeps the original as well.
        assert_eq!(translated.reflection_questions, vec!["What would you do?"]);
        assert_eq!(translated.discussion_prompts, vec!["Sprecht über Mut."]);
    }

    #[test]
    fn test_entirely_unstructured_output_degrades_gracefully() {
        let translated = TranslatedStory::parse("gibberish with no markers", &original(), "German");
        assert_eq!(translated.title, "The Brave Fox (German)");
        assert_eq!(translated.content, "");
        assert_eq!(translated.reflection_questions, vec!["What would you do?"]);
        assert_eq!(translated.action_steps, vec!["Practice courage."]);
        assert_eq!(translated.discussion_prompts, vec!["Discuss bravery."]);
    }
}
