//! Remote model service engine
//!
//! Forwards validated stage input to an external HTTP service. Text stages
//! are posted as JSON; audio stages as multipart forms carrying the raw
//! upload. The service answers every stage with
//! `{"result": ..., "assumptions": [...], "warnings": [...]}`.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use studio_core::domain::asset::AudioAsset;
use studio_core::domain::compose::{ComposeIn, CompositionResult};
use studio_core::domain::job::StageKind;
use studio_core::domain::lyrics::{LyricsIn, LyricsResult};
use studio_core::domain::reintegrate::{ReintegrateIn, ReintegrationPlan};
use studio_core::domain::separate::{SeparateIn, SeparationPlan};

use super::{
    ComposeEngine, EngineError, EngineOutput, EngineResult, LyricsEngine, ReintegrationEngine,
    SeparationEngine,
};

#[derive(Deserialize)]
struct RemoteReply<T> {
    result: T,
    #[serde(default)]
    assumptions: Vec<String>,
    #[serde(default)]
    warnings: Vec<String>,
}

/// Engine backed by an external model service
#[derive(Debug, Clone)]
pub struct RemoteEngine {
    base_url: String,
    client: Client,
}

impl RemoteEngine {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn url(&self, kind: StageKind) -> String {
        format!("{}/v1/{}", self.base_url, kind.as_str())
    }

    async fn post_json<I, T>(&self, kind: StageKind, input: &I) -> EngineResult<T>
    where
        I: serde::Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.url(kind))
            .json(input)
            .send()
            .await
            .map_err(|e| transport_error(kind, e))?;
        handle_response(kind, response).await
    }

    async fn post_form<T: DeserializeOwned>(&self, kind: StageKind, form: Form) -> EngineResult<T> {
        let response = self
            .client
            .post(self.url(kind))
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport_error(kind, e))?;
        handle_response(kind, response).await
    }
}

fn transport_error(kind: StageKind, e: reqwest::Error) -> EngineError {
    tracing::warn!("Request to engine for {} failed: {}", kind, e);
    if e.is_timeout() {
        EngineError::Unavailable(format!("request timed out: {e}"))
    } else {
        EngineError::Unavailable(e.to_string())
    }
}

async fn handle_response<T: DeserializeOwned>(
    kind: StageKind,
    response: Response,
) -> EngineResult<T> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::warn!("Engine answered {} for {}: {}", status, kind, body);
        return Err(if status.is_client_error() {
            EngineError::Rejected(format!("{kind} input was rejected by the generation engine"))
        } else {
            EngineError::Unavailable(format!("HTTP {status}: {body}"))
        });
    }

    let reply: RemoteReply<T> = response
        .json()
        .await
        .map_err(|e| EngineError::Malformed(e.to_string()))?;

    Ok(EngineOutput {
        value: reply.result,
        assumptions: reply.assumptions,
        warnings: reply.warnings,
    })
}

fn file_part(asset: &AudioAsset) -> Part {
    let part = Part::bytes(asset.data.clone()).file_name(asset.filename.clone());
    match asset.content_type.as_deref() {
        Some(mime) => match part.mime_str(mime) {
            Ok(part) => part,
            Err(_) => Part::bytes(asset.data.clone()).file_name(asset.filename.clone()),
        },
        None => part,
    }
}

#[async_trait]
impl LyricsEngine for RemoteEngine {
    async fn generate(&self, input: &LyricsIn) -> EngineResult<LyricsResult> {
        self.post_json(StageKind::LyricsGenerate, input).await
    }
}

#[async_trait]
impl ComposeEngine for RemoteEngine {
    async fn compose(&self, input: &ComposeIn) -> EngineResult<CompositionResult> {
        self.post_json(StageKind::ComposeGenerate, input).await
    }
}

#[async_trait]
impl SeparationEngine for RemoteEngine {
    async fn separate(&self, input: &SeparateIn) -> EngineResult<SeparationPlan> {
        let form = Form::new().part("file", file_part(&input.file));
        self.post_form(StageKind::SeparateVocals, form).await
    }
}

#[async_trait]
impl ReintegrationEngine for RemoteEngine {
    async fn reintegrate(&self, input: &ReintegrateIn) -> EngineResult<ReintegrationPlan> {
        let form = Form::new()
            .part("instrumental", file_part(&input.instrumental))
            .part("vocals", file_part(&input.vocals))
            .text("key", input.key.clone())
            .text("tempo_bpm", input.tempo_bpm.to_string())
            .text("preset", input.preset.clone());
        self.post_form(StageKind::MixReintegrate, form).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studio_core::domain::lyrics::SectionCounts;

    #[test]
    fn test_url_joins_stage_name() {
        let engine = RemoteEngine::new("http://models.local:9000/", Duration::from_secs(5));
        assert_eq!(
            engine.url(StageKind::SeparateVocals),
            "http://models.local:9000/v1/separate.vocals"
        );
    }

    #[test]
    fn test_reply_defaults_notes() {
        let reply: RemoteReply<u32> = serde_json::from_str(r#"{"result": 3}"#).unwrap();
        assert_eq!(reply.result, 3);
        assert!(reply.assumptions.is_empty());
        assert!(reply.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_service_is_unavailable() {
        // Port 9 (discard) on localhost is not expected to accept HTTP
        let engine = RemoteEngine::new("http://127.0.0.1:9", Duration::from_secs(2));
        let input = LyricsIn {
            genre: "pop".into(),
            mood: "joyful".into(),
            length: SectionCounts {
                verses: 1,
                choruses: 1,
            },
            prompt: None,
        };
        let err = engine.generate(&input).await.unwrap_err();
        assert!(matches!(err, EngineError::Unavailable(_)));
        assert_eq!(err.public_message(), "generation engine is unavailable");
    }
}
