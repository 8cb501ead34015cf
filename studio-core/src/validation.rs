//! Request validation
//!
//! Validation is structural and value-range only: presence, length, numeric
//! bounds. Whether a value is musically meaningful (a real key, decodable
//! audio) is left to the generation engine.
//!
//! Every failing field is collected so a caller can fix all of them at once,
//! and every default that gets filled in is recorded as an assumption for the
//! response envelope.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use thiserror::Error;

use crate::domain::asset::AudioAsset;

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Input rejected before any job was created
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid input: {}", describe(.fields))]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            fields: vec![FieldError {
                field: field.into(),
                message: message.into(),
            }],
        }
    }
}

fn describe(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| format!("{} {}", f.field, f.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validated stage input together with the defaults applied to build it
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    pub input: T,
    pub assumptions: Vec<String>,
}

/// Collects field errors and assumptions while a request is resolved
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
    assumptions: Vec<String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reject(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn assume(&mut self, note: impl Into<String>) {
        self.assumptions.push(note.into());
    }

    /// Non-empty text of bounded length, falling back to `default` when absent
    pub fn text(
        &mut self,
        field: &str,
        value: Option<String>,
        default: &str,
        max_len: usize,
    ) -> String {
        match value {
            None => {
                self.assume(format!("{field} not provided; using \"{default}\""));
                default.to_string()
            }
            Some(value) => {
                let value = value.trim();
                if value.is_empty() {
                    self.reject(field, "must not be empty");
                } else if value.chars().count() > max_len {
                    self.reject(field, format!("must be at most {max_len} characters"));
                }
                value.to_string()
            }
        }
    }

    /// Optional text; blank values count as absent
    pub fn optional_text(
        &mut self,
        field: &str,
        value: Option<String>,
        max_len: usize,
    ) -> Option<String> {
        let value = value?;
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        if value.chars().count() > max_len {
            self.reject(field, format!("must be at most {max_len} characters"));
        }
        Some(value.to_string())
    }

    /// Integer within `range`, falling back to `default` when absent
    pub fn integer(
        &mut self,
        field: &str,
        value: Option<i64>,
        default: u32,
        range: RangeInclusive<u32>,
    ) -> u32 {
        match value {
            None => {
                self.assume(format!("{field} not provided; using {default}"));
                default
            }
            Some(value) => {
                if value < i64::from(*range.start()) || value > i64::from(*range.end()) {
                    self.reject(
                        field,
                        format!("must be between {} and {}", range.start(), range.end()),
                    );
                    default
                } else {
                    value as u32
                }
            }
        }
    }

    /// A required upload with a filename and at least one byte
    pub fn asset(&mut self, field: &str, value: Option<AudioAsset>) -> AudioAsset {
        match value {
            None => {
                self.reject(field, "is required");
                AudioAsset::default()
            }
            Some(asset) => {
                if asset.filename.trim().is_empty() {
                    self.reject(field, "must have a filename");
                }
                if asset.data.is_empty() {
                    self.reject(field, "must not be empty");
                }
                asset
            }
        }
    }

    pub fn finish<T>(self, input: T) -> Result<Resolved<T>, ValidationError> {
        if self.errors.is_empty() {
            Ok(Resolved {
                input,
                assumptions: self.assumptions,
            })
        } else {
            Err(ValidationError {
                fields: self.errors,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_default_is_recorded_as_assumption() {
        let mut v = Validator::new();
        let genre = v.text("genre", None, "pop", 64);
        assert_eq!(genre, "pop");

        let resolved = v.finish(genre).unwrap();
        assert_eq!(resolved.assumptions.len(), 1);
        assert!(resolved.assumptions[0].contains("genre"));
    }

    #[test]
    fn test_text_rejects_blank_and_overlong() {
        let mut v = Validator::new();
        v.text("genre", Some("   ".to_string()), "pop", 64);
        v.text("mood", Some("x".repeat(65)), "joyful", 64);

        let err = v.finish(()).unwrap_err();
        assert_eq!(err.fields.len(), 2);
        assert_eq!(err.fields[0].field, "genre");
        assert_eq!(err.fields[1].field, "mood");
    }

    #[test]
    fn test_integer_range() {
        let mut v = Validator::new();
        assert_eq!(v.integer("tempo_bpm", Some(128), 120, 20..=300), 128);
        v.integer("tempo_bpm", Some(-4), 120, 20..=300);
        v.integer("tempo_bpm", Some(301), 120, 20..=300);

        let err = v.finish(()).unwrap_err();
        assert_eq!(err.fields.len(), 2);
        assert!(err.to_string().contains("must be between 20 and 300"));
    }

    #[test]
    fn test_optional_text_blank_is_absent() {
        let mut v = Validator::new();
        assert_eq!(v.optional_text("prompt", Some("  ".to_string()), 10), None);
        assert_eq!(
            v.optional_text("prompt", Some(" hi ".to_string()), 10),
            Some("hi".to_string())
        );
        assert!(v.finish(()).is_ok());
    }

    #[test]
    fn test_asset_requires_bytes_and_name() {
        let mut v = Validator::new();
        v.asset("file", None);
        v.asset("vocals", Some(AudioAsset::new("", vec![])));

        let err = v.finish(()).unwrap_err();
        let fields: Vec<_> = err.fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, vec!["file", "vocals", "vocals"]);
    }
}
