//! Job-related API endpoints

use studio_core::domain::job::Job;
use uuid::Uuid;

use crate::StudioClient;
use crate::error::Result;

impl StudioClient {
    /// Get the current snapshot of a job
    ///
    /// Returns `ClientError::NotFound` for an unknown id.
    pub async fn job_status(&self, job_id: Uuid) -> Result<Job> {
        let url = format!("{}/v1/jobs/{}/status", self.base_url, job_id);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// List all jobs, oldest first
    pub async fn list_jobs(&self) -> Result<Vec<Job>> {
        let url = format!("{}/v1/jobs", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }
}
