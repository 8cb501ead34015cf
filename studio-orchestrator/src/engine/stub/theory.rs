//! Just enough music theory to derive chords from a key name

use std::fmt;

const SHARP_NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];
const FLAT_NAMES: [&str; 12] = ["C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B"];

const MAJOR_STEPS: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];
const MINOR_STEPS: [u8; 7] = [0, 2, 3, 5, 7, 8, 10];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Major,
    Minor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quality {
    Major,
    Minor,
    Diminished,
}

const MAJOR_QUALITIES: [Quality; 7] = [
    Quality::Major,
    Quality::Minor,
    Quality::Minor,
    Quality::Major,
    Quality::Major,
    Quality::Minor,
    Quality::Diminished,
];

const MINOR_QUALITIES: [Quality; 7] = [
    Quality::Minor,
    Quality::Diminished,
    Quality::Major,
    Quality::Minor,
    Quality::Minor,
    Quality::Major,
    Quality::Major,
];

/// A parsed key such as `C major`, `F# minor` or `Bbm`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key {
    tonic: u8,
    mode: Mode,
    flats: bool,
}

impl Key {
    /// Parses `<tonic>[#|b] [major|minor|maj|min|m]`; a bare tonic is major
    pub fn parse(raw: &str) -> Option<Key> {
        let raw = raw.trim();
        let mut chars = raw.chars();
        let letter = chars.next()?.to_ascii_uppercase();
        let natural: u8 = match letter {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return None,
        };

        let rest = chars.as_str();
        let (tonic, accidental, rest) = if let Some(rest) = rest.strip_prefix('#') {
            ((natural + 1) % 12, Some('#'), rest)
        } else if let Some(rest) = rest.strip_prefix('b') {
            ((natural + 11) % 12, Some('b'), rest)
        } else {
            (natural, None, rest)
        };

        let mode = match rest.trim().to_ascii_lowercase().as_str() {
            "" | "major" | "maj" => Mode::Major,
            "minor" | "min" | "m" => Mode::Minor,
            _ => return None,
        };

        let flats = match accidental {
            Some('b') => true,
            Some(_) => false,
            None => match mode {
                Mode::Major => tonic == 5,
                Mode::Minor => matches!(tonic, 0 | 2 | 5 | 7),
            },
        };

        Some(Key { tonic, mode, flats })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Triad on scale degree `degree` (1-based), e.g. `Am` for degree 6 of C major
    pub fn chord(&self, degree: usize) -> String {
        let index = (degree.max(1) - 1) % 7;
        let (steps, qualities) = match self.mode {
            Mode::Major => (&MAJOR_STEPS, &MAJOR_QUALITIES),
            Mode::Minor => (&MINOR_STEPS, &MINOR_QUALITIES),
        };

        let pitch = usize::from((self.tonic + steps[index]) % 12);
        let root = if self.flats {
            FLAT_NAMES[pitch]
        } else {
            SHARP_NAMES[pitch]
        };

        match qualities[index] {
            Quality::Major => root.to_string(),
            Quality::Minor => format!("{root}m"),
            Quality::Diminished => format!("{root}dim"),
        }
    }

    pub fn progression(&self, degrees: &[usize]) -> Vec<String> {
        degrees.iter().map(|&d| self.chord(d)).collect()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = if self.flats { &FLAT_NAMES } else { &SHARP_NAMES };
        let mode = match self.mode {
            Mode::Major => "major",
            Mode::Minor => "minor",
        };
        write!(f, "{} {}", names[usize::from(self.tonic)], mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_c_major_progressions() {
        let key = Key::parse("C major").unwrap();
        assert_eq!(key.progression(&[1, 5, 6, 4]), vec!["C", "G", "Am", "F"]);
        assert_eq!(key.progression(&[4, 5, 3, 6]), vec!["F", "G", "Em", "Am"]);
        assert_eq!(key.chord(7), "Bdim");
    }

    #[test]
    fn test_minor_keys() {
        let key = Key::parse("A minor").unwrap();
        assert_eq!(key.mode(), Mode::Minor);
        assert_eq!(key.progression(&[1, 6, 3, 7]), vec!["Am", "F", "C", "G"]);

        let key = Key::parse("f#m").unwrap();
        assert_eq!(key.progression(&[1, 4, 5]), vec!["F#m", "Bm", "C#m"]);
    }

    #[test]
    fn test_flat_spelling() {
        let key = Key::parse("Bb major").unwrap();
        assert_eq!(key.progression(&[1, 4, 5]), vec!["Bb", "Eb", "F"]);

        let key = Key::parse("D minor").unwrap();
        assert_eq!(key.chord(6), "Bb");
        assert_eq!(key.to_string(), "D minor");
    }

    #[test]
    fn test_bare_tonic_is_major() {
        assert_eq!(Key::parse("G").unwrap().mode(), Mode::Major);
        assert_eq!(Key::parse("  E maj ").unwrap().chord(1), "E");
    }

    #[test]
    fn test_rejects_unknown_keys() {
        assert_eq!(Key::parse("H major"), None);
        assert_eq!(Key::parse("C lydian"), None);
        assert_eq!(Key::parse(""), None);
    }
}
