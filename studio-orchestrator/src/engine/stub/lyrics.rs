//! Template lyric writer

use studio_core::domain::lyrics::{
    LyricConstraints, LyricSection, LyricsIn, LyricsResult, LyricsStyle, SectionKind,
};

const RHYME_SCHEME: &str = "AABB";
const SYLLABLES_PER_LINE: u32 = 8;

pub fn write(input: &LyricsIn) -> LyricsResult {
    let keywords = input.keywords();
    let theme = keywords
        .first()
        .cloned()
        .unwrap_or_else(|| "this feeling".to_string());

    let title = match keywords.first() {
        Some(keyword) => title_case(keyword),
        None => format!("{} {}", title_case(&input.mood), title_case(&input.genre)),
    };

    let sections = section_order(input.length.verses, input.length.choruses)
        .into_iter()
        .map(|(kind, n)| {
            let lines = match kind {
                SectionKind::Verse => verse_lines(n, &theme, input),
                SectionKind::Chorus => chorus_lines(&theme, input),
            };
            let prefix = match kind {
                SectionKind::Verse => 'V',
                SectionKind::Chorus => 'C',
            };
            LyricSection {
                id: format!("{prefix}{n}"),
                kind,
                lines,
            }
        })
        .collect::<Vec<_>>();

    let line_count = sections.first().map(|s| s.lines.len()).unwrap_or(0);

    LyricsResult {
        title,
        style: LyricsStyle {
            genre: input.genre.clone(),
            mood: input.mood.clone(),
        },
        constraints: LyricConstraints {
            rhyme_scheme: RHYME_SCHEME.to_string(),
            syllables_per_line: vec![SYLLABLES_PER_LINE; line_count],
            keywords,
            tone: "direct".to_string(),
        },
        sections,
        notes: Some("template output from the stub engine".to_string()),
    }
}

/// Verses and choruses alternate, starting with a verse; leftovers go last
fn section_order(verses: u32, choruses: u32) -> Vec<(SectionKind, u32)> {
    let mut order = Vec::new();
    for n in 1..=verses.max(choruses) {
        if n <= verses {
            order.push((SectionKind::Verse, n));
        }
        if n <= choruses {
            order.push((SectionKind::Chorus, n));
        }
    }
    order
}

fn verse_lines(n: u32, theme: &str, input: &LyricsIn) -> Vec<String> {
    let opening = match n % 3 {
        1 => "Woke up to the morning light",
        2 => "Streetlights humming through the night",
        _ => "Pages turning, holding tight",
    };
    vec![
        opening.to_string(),
        format!("Feeling {} and burning bright", input.mood),
        format!("Carry {theme} in every step"),
        format!("{} rhythm that the heart has kept", capitalize(&input.genre)),
    ]
}

fn chorus_lines(theme: &str, input: &LyricsIn) -> Vec<String> {
    vec![
        format!("Oh, {theme}, let it ring"),
        format!("Every {} heart begins to sing", input.mood),
        "Hold it close and hold it near".to_string(),
        format!("Turn the {} up, the night is here", input.genre),
    ]
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn title_case(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use studio_core::domain::lyrics::SectionCounts;

    fn input(verses: u32, choruses: u32, prompt: Option<&str>) -> LyricsIn {
        LyricsIn {
            genre: "pop".into(),
            mood: "joyful".into(),
            length: SectionCounts { verses, choruses },
            prompt: prompt.map(str::to_string),
        }
    }

    #[test]
    fn test_section_order_alternates() {
        let ids: Vec<String> = write(&input(2, 1, None))
            .sections
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec!["V1", "C1", "V2"]);

        let kinds: Vec<SectionKind> = section_order(1, 3).into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            kinds,
            vec![
                SectionKind::Verse,
                SectionKind::Chorus,
                SectionKind::Chorus,
                SectionKind::Chorus
            ]
        );
    }

    #[test]
    fn test_title_comes_from_prompt_or_style() {
        assert_eq!(write(&input(1, 1, None)).title, "Joyful Pop");
        assert_eq!(
            write(&input(1, 1, Some("summer love, joy and nostalgia"))).title,
            "Summer Love"
        );
    }

    #[test]
    fn test_constraints_follow_sections() {
        let result = write(&input(2, 1, Some("summer love, joy and nostalgia")));
        assert_eq!(result.constraints.rhyme_scheme, "AABB");
        assert_eq!(result.constraints.syllables_per_line, vec![8, 8, 8, 8]);
        assert_eq!(
            result.constraints.keywords,
            vec!["summer love", "joy and nostalgia"]
        );
        assert!(result.sections.iter().all(|s| s.lines.len() == 4));
        assert!(result.sections[0].lines[2].contains("summer love"));
    }

    #[test]
    fn test_output_is_deterministic() {
        let a = write(&input(3, 2, Some("rain")));
        let b = write(&input(3, 2, Some("rain")));
        assert_eq!(a, b);
    }
}
