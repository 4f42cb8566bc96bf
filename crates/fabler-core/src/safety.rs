//! Content safety filtering for generation prompts.
//!
//! The check runs before any paid upstream call so rejected prompts never
//! consume credits. Banned words come from a built-in baseline plus whatever
//! the `content_filters` table adds at request time.

use crate::AppError;

/// Baseline banned phrases, always active regardless of database contents.
const BUILTIN_BANNED: &[&str] = &[
    "nude", "naked", "explicit", "nsfw", "porn", "violence", "gore", "blood",
];

/// Case-insensitive substring filter over a prompt.
#[derive(Debug, Clone, Default)]
pub struct ContentSafetyFilter {
    extra_words: Vec<String>,
}

impl ContentSafetyFilter {
    pub fn new(extra_words: Vec<String>) -> Self {
        Self { extra_words }
    }

    /// Reject the prompt if it contains any banned phrase.
    pub fn check(&self, prompt: &str) -> Result<(), AppError> {
        let lowered = prompt.to_lowercase();
        let hit = BUILTIN_BANNED
            .iter()
            .map(|w| *w)
            .chain(self.extra_words.iter().map(|w| w.as_str()))
            .find(|w| !w.is_empty() && lowered.contains(&w.to_lowercase()));
        match hit {
            Some(_) => Err(AppError::ContentPolicy(
                "Content safety check failed".to_string(),
            )),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_prompt_passes() {
        let filter = ContentSafetyFilter::default();
        assert!(filter
            .check("A friendly dragon teaching kids about honesty")
            .is_ok());
    }

    #[test]
    fn test_builtin_word_rejected_case_insensitive() {
        let filter = ContentSafetyFilter::default();
        assert!(filter.check("a scene with BLOOD everywhere").is_err());
    }

    #[test]
    fn test_extra_words_from_database_rejected() {
        let filter = ContentSafetyFilter::new(vec!["scary clown".to_string()]);
        assert!(filter.check("a Scary Clown under the bed").is_err());
        assert!(filter.check("a happy clown at a party").is_ok());
    }
}
