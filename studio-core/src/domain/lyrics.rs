//! `lyrics.generate` stage contract

use serde::{Deserialize, Serialize};

/// How many sections of each kind to write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionCounts {
    pub verses: u32,
    pub choruses: u32,
}

/// Validated lyrics input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricsIn {
    pub genre: String,
    pub mood: String,
    pub length: SectionCounts,
    pub prompt: Option<String>,
}

impl LyricsIn {
    /// The first two `", "`-separated phrases of the prompt, verbatim
    pub fn keywords(&self) -> Vec<String> {
        match self.prompt.as_deref() {
            Some(prompt) if !prompt.is_empty() => {
                prompt.split(", ").take(2).map(str::to_string).collect()
            }
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Verse,
    Chorus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricSection {
    pub id: String,
    pub kind: SectionKind,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricsStyle {
    pub genre: String,
    pub mood: String,
}

/// Writing constraints the lyrics were produced under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricConstraints {
    pub rhyme_scheme: String,
    pub syllables_per_line: Vec<u32>,
    pub keywords: Vec<String>,
    pub tone: String,
}

/// Lyrics stage output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricsResult {
    pub title: String,
    pub style: LyricsStyle,
    pub constraints: LyricConstraints,
    /// Sections in performance order
    pub sections: Vec<LyricSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(prompt: Option<&str>) -> LyricsIn {
        LyricsIn {
            genre: "pop".into(),
            mood: "joyful".into(),
            length: SectionCounts {
                verses: 2,
                choruses: 1,
            },
            prompt: prompt.map(str::to_string),
        }
    }

    #[test]
    fn test_keywords_take_first_two_phrases() {
        let lyrics = input(Some("summer love, joy and nostalgia, late nights"));
        assert_eq!(lyrics.keywords(), vec!["summer love", "joy and nostalgia"]);
    }

    #[test]
    fn test_keywords_without_prompt() {
        assert!(input(None).keywords().is_empty());
        assert_eq!(input(Some("rain")).keywords(), vec!["rain"]);
        assert!(input(Some("")).keywords().is_empty());
    }

    #[test]
    fn test_keywords_split_only_on_comma_space() {
        assert_eq!(input(Some("rock,roll")).keywords(), vec!["rock,roll"]);
        assert_eq!(
            input(Some("neon,  rain, dusk")).keywords(),
            vec!["neon", " rain"]
        );
        assert_eq!(input(Some("a, , b")).keywords(), vec!["a", ""]);
    }
}
