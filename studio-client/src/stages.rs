//! Stage endpoints: runs, detached submissions and plans

use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde::de::DeserializeOwned;
use studio_core::domain::asset::AudioAsset;
use studio_core::domain::compose::CompositionResult;
use studio_core::domain::job::StageKind;
use studio_core::domain::lyrics::LyricsResult;
use studio_core::domain::reintegrate::ReintegrationPlan;
use studio_core::domain::separate::SeparationPlan;
use studio_core::dto::response::{
    CompositionPlanResponse, LyricsPlanResponse, ReintegrationPlanResponse,
    SeparationPlanResponse, StageResponse, SubmitResponse,
};
use studio_core::dto::stage::{ComposeRequest, LyricsRequest, MixRequest, SeparateRequest};

use crate::StudioClient;
use crate::error::{ClientError, Result};

impl StudioClient {
    // =============================================================================
    // Stage Runs
    // =============================================================================

    /// Run `lyrics.generate` to completion
    pub async fn generate_lyrics(&self, req: LyricsRequest) -> Result<StageResponse<LyricsResult>> {
        self.post_json(&self.stage_url(StageKind::LyricsGenerate, false), &req)
            .await
    }

    /// Run `compose.generate` to completion
    pub async fn compose(&self, req: ComposeRequest) -> Result<StageResponse<CompositionResult>> {
        self.post_json(&self.stage_url(StageKind::ComposeGenerate, false), &req)
            .await
    }

    /// Run `separate.vocals` to completion
    pub async fn separate_vocals(
        &self,
        req: SeparateRequest,
    ) -> Result<StageResponse<SeparationPlan>> {
        self.post_form(
            &self.stage_url(StageKind::SeparateVocals, false),
            separate_form(req)?,
        )
        .await
    }

    /// Run `mix.reintegrate` to completion
    pub async fn reintegrate(&self, req: MixRequest) -> Result<StageResponse<ReintegrationPlan>> {
        self.post_form(
            &self.stage_url(StageKind::MixReintegrate, false),
            mix_form(req)?,
        )
        .await
    }

    // =============================================================================
    // Detached Submissions
    // =============================================================================

    /// Queue `lyrics.generate`; poll the returned job for the result
    pub async fn submit_lyrics(&self, req: LyricsRequest) -> Result<SubmitResponse> {
        self.post_json(&self.stage_url(StageKind::LyricsGenerate, true), &req)
            .await
    }

    pub async fn submit_compose(&self, req: ComposeRequest) -> Result<SubmitResponse> {
        self.post_json(&self.stage_url(StageKind::ComposeGenerate, true), &req)
            .await
    }

    pub async fn submit_separate(&self, req: SeparateRequest) -> Result<SubmitResponse> {
        self.post_form(
            &self.stage_url(StageKind::SeparateVocals, true),
            separate_form(req)?,
        )
        .await
    }

    pub async fn submit_reintegrate(&self, req: MixRequest) -> Result<SubmitResponse> {
        self.post_form(&self.stage_url(StageKind::MixReintegrate, true), mix_form(req)?)
            .await
    }

    // =============================================================================
    // Plans (no job recorded)
    // =============================================================================

    pub async fn plan_lyrics(&self, req: LyricsRequest) -> Result<LyricsPlanResponse> {
        self.post_json(&format!("{}/v1/ai/lyrics", self.base_url), &req)
            .await
    }

    pub async fn plan_compose(&self, req: ComposeRequest) -> Result<CompositionPlanResponse> {
        self.post_json(&format!("{}/v1/ai/compose", self.base_url), &req)
            .await
    }

    pub async fn plan_separate(&self, req: SeparateRequest) -> Result<SeparationPlanResponse> {
        self.post_form(
            &format!("{}/v1/ai/separate", self.base_url),
            separate_form(req)?,
        )
        .await
    }

    pub async fn plan_reintegrate(&self, req: MixRequest) -> Result<ReintegrationPlanResponse> {
        self.post_form(
            &format!("{}/v1/ai/reintegrate", self.base_url),
            mix_form(req)?,
        )
        .await
    }

    // =============================================================================
    // Helpers
    // =============================================================================

    fn stage_url(&self, kind: StageKind, detached: bool) -> String {
        if detached {
            format!("{}/v1/{}?mode=detached", self.base_url, kind.as_str())
        } else {
            format!("{}/v1/{}", self.base_url, kind.as_str())
        }
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, url: &str, body: &B) -> Result<T> {
        let response = self.client.post(url).json(body).send().await?;
        self.handle_response(response).await
    }

    async fn post_form<T: DeserializeOwned>(&self, url: &str, form: Form) -> Result<T> {
        let response = self.client.post(url).multipart(form).send().await?;
        self.handle_response(response).await
    }
}

fn file_part(asset: AudioAsset) -> Result<Part> {
    let part = Part::bytes(asset.data).file_name(asset.filename);
    match asset.content_type {
        Some(mime) => part
            .mime_str(&mime)
            .map_err(|e| ClientError::InvalidRequest(format!("bad content type '{mime}': {e}"))),
        None => Ok(part),
    }
}

fn separate_form(req: SeparateRequest) -> Result<Form> {
    let mut form = Form::new();
    if let Some(file) = req.file {
        form = form.part("file", file_part(file)?);
    }
    Ok(form)
}

fn mix_form(req: MixRequest) -> Result<Form> {
    let mut form = Form::new();
    if let Some(instrumental) = req.instrumental {
        form = form.part("instrumental", file_part(instrumental)?);
    }
    if let Some(vocals) = req.vocals {
        form = form.part("vocals", file_part(vocals)?);
    }
    for (name, value) in [
        ("key", req.key),
        ("tempo_bpm", req.tempo_bpm),
        ("preset", req.preset),
    ] {
        if let Some(value) = value {
            form = form.text(name, value);
        }
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_urls() {
        let client = StudioClient::new("http://localhost:8000");
        assert_eq!(
            client.stage_url(StageKind::MixReintegrate, false),
            "http://localhost:8000/v1/mix.reintegrate"
        );
        assert_eq!(
            client.stage_url(StageKind::LyricsGenerate, true),
            "http://localhost:8000/v1/lyrics.generate?mode=detached"
        );
    }

    #[test]
    fn test_bad_content_type_is_rejected() {
        let asset = AudioAsset::new("a.wav", vec![1]).with_content_type("not a mime\n");
        assert!(matches!(
            file_part(asset),
            Err(ClientError::InvalidRequest(_))
        ));
    }
}
