//! Parsing raw generated story text into title, body, and moral.
//!
//! The model is instructed to put a title on the first line and a trailing
//! "Moral:" section, but the parser tolerates output that ignores either
//! instruction.

/// A generated story, split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedStory {
    pub title: String,
    pub body: String,
    pub moral: String,
}

const DEFAULT_TITLE: &str = "Untitled Story";
const MORAL_MARKER: &str = "Moral:";

impl ParsedStory {
    /// Split raw model output on the first "Moral:" marker, then take the
    /// first line of the remainder as the title.
    pub fn parse(content: &str) -> Self {
        let (story_part, moral) = match content.split_once(MORAL_MARKER) {
            Some((before, after)) => (before.trim(), after.trim()),
            None => (content.trim(), ""),
        };

        let (title, body) = match story_part.split_once('\n') {
            Some((first_line, rest)) if !first_line.trim().is_empty() => {
                (first_line.trim().to_string(), rest.trim().to_string())
            }
            _ => (DEFAULT_TITLE.to_string(), story_part.to_string()),
        };

        ParsedStory {
            title,
            body,
            moral: moral.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_story_parses_into_parts() {
        let content = "The Brave Fox\n\nOnce upon a time a fox was brave.\n\nMoral: Courage matters.";
        let parsed = ParsedStory::parse(content);
        assert_eq!(parsed.title, "The Brave Fox");
        assert_eq!(parsed.body, "Once upon a time a fox was brave.");
        assert_eq!(parsed.moral, "Courage matters.");
    }

    #[test]
    fn test_missing_moral_leaves_it_empty() {
        let parsed = ParsedStory::parse("A Tale\nSomething happened.");
        assert_eq!(parsed.title, "A Tale");
        assert_eq!(parsed.body, "Something happened.");
        assert_eq!(parsed.moral, "");
    }

    #[test]
    fn test_single_line_story_gets_default_title() {
        let parsed = ParsedStory::parse("Just one line of story.");
        assert_eq!(parsed.title, "Untitled Story");
        assert_eq!(parsed.body, "Just one line of story.");
    }

    #[test]
    fn test_only_first_moral_marker_splits() {
        let content = "Title\nBody mentions Moral: twice.\nMoral: Be kind.";
        let parsed = ParsedStory::parse(content);
        // The split happens at the first marker, the rest stays verbatim.
        assert_eq!(parsed.title, "Title");
        assert!(parsed.moral.contains("twice."));
    }

    #[test]
    fn test_empty_input() {
        let parsed = ParsedStory::parse("");
        assert_eq!(parsed.title, "Untitled Story");
        assert_eq!(parsed.body, "");
        assert_eq!(parsed.moral, "");
    }
}
