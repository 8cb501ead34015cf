//! Multipart upload parsing
//!
//! Stage endpoints that take audio receive `multipart/form-data`. Parts with
//! a filename become `AudioAsset`s, every other part is read as text.

use std::collections::HashMap;

use axum::extract::Multipart;
use studio_core::domain::asset::AudioAsset;
use studio_core::dto::stage::{MixRequest, SeparateRequest};

use crate::api::error::ApiResult;

/// Parts of a multipart form, keyed by field name
#[derive(Debug, Default)]
pub struct UploadForm {
    files: HashMap<String, AudioAsset>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    pub async fn read(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            match field.file_name().map(str::to_string) {
                Some(filename) => {
                    let content_type = field.content_type().map(str::to_string);
                    let data = field.bytes().await?;
                    tracing::debug!("Received upload {} ({} bytes)", filename, data.len());

                    let mut asset = AudioAsset::new(filename, data.to_vec());
                    if let Some(content_type) = content_type {
                        asset = asset.with_content_type(content_type);
                    }
                    form.files.insert(name, asset);
                }
                None => {
                    let text = field.text().await?;
                    form.fields.insert(name, text);
                }
            }
        }

        Ok(form)
    }

    pub fn file(&mut self, name: &str) -> Option<AudioAsset> {
        self.files.remove(name)
    }

    pub fn text(&mut self, name: &str) -> Option<String> {
        self.fields.remove(name)
    }

    pub fn into_separate_request(mut self) -> SeparateRequest {
        SeparateRequest {
            file: self.file("file"),
        }
    }

    pub fn into_mix_request(mut self) -> MixRequest {
        MixRequest {
            instrumental: self.file("instrumental"),
            vocals: self.file("vocals"),
            key: self.text("key"),
            tempo_bpm: self.text("tempo_bpm"),
            preset: self.text("preset"),
        }
    }
}
