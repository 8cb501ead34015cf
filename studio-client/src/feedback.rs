//! Feedback endpoint

use studio_core::dto::feedback::{FeedbackAck, FeedbackRequest};

use crate::StudioClient;
use crate::error::Result;

impl StudioClient {
    /// Rate generated material
    pub async fn submit_feedback(&self, req: FeedbackRequest) -> Result<FeedbackAck> {
        let url = format!("{}/v1/feedback", self.base_url);
        let response = self.client.post(&url).json(&req).send().await?;

        self.handle_response(response).await
    }
}
