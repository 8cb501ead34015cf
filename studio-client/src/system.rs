//! System prompt and project endpoints

use studio_core::domain::project::ProjectSummary;
use studio_core::dto::response::SystemPromptResponse;

use crate::StudioClient;
use crate::error::Result;

impl StudioClient {
    /// Fetch the instructions the orchestrator hands to hosted engines
    pub async fn system_prompt(&self) -> Result<String> {
        let url = format!("{}/v1/system.prompt", self.base_url);
        let response = self.client.get(&url).send().await?;

        let body: SystemPromptResponse = self.handle_response(response).await?;
        Ok(body.prompt)
    }

    /// Look up a project summary
    pub async fn project(&self, project_id: &str) -> Result<ProjectSummary> {
        let url = format!("{}/v1/projects/{}", self.base_url, project_id);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }
}
