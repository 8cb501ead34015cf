//! Uploaded audio assets

use serde::{Deserialize, Serialize};

/// An audio file handed to a stage
///
/// The raw bytes never travel inside JSON; only the descriptive fields do.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AudioAsset {
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl AudioAsset {
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            data,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// File extension in lowercase, if the filename has one
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
    }

    /// Filename without directory or extension, used to name derived stems
    pub fn stem(&self) -> String {
        std::path::Path::new(&self.filename)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.is_empty())
            .unwrap_or("asset")
            .to_string()
    }
}

impl std::fmt::Debug for AudioAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioAsset")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("size", &self.data.len())
            .finish()
    }
}
