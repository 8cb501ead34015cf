//! Studio HTTP Client
//!
//! A simple, type-safe HTTP client for the Studio orchestrator API.
//!
//! # Example
//!
//! ```no_run
//! use studio_client::StudioClient;
//! use studio_core::dto::stage::LyricsRequest;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = StudioClient::new("http://localhost:8000");
//!
//!     let response = client.generate_lyrics(LyricsRequest {
//!         prompt: Some("summer love, joy and nostalgia".to_string()),
//!         ..Default::default()
//!     }).await?;
//!
//!     println!("Job {}: {}", response.job_id, response.result.title);
//!     Ok(())
//! }
//! ```

pub mod error;
mod feedback;
mod jobs;
mod stages;
mod system;

// Re-export commonly used types
pub use error::{ClientError, Result};

use reqwest::Client;
use serde::de::DeserializeOwned;
use studio_core::dto::response::ErrorBody;

/// HTTP client for the Studio orchestrator API
///
/// Methods are organized into groups:
/// - Stage runs, detached submissions and plans
/// - Job status and listing
/// - Feedback
/// - System prompt and project lookup
#[derive(Debug, Clone)]
pub struct StudioClient {
    /// Base URL of the orchestrator (e.g., "http://localhost:8000")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl StudioClient {
    /// Create a new client
    ///
    /// # Example
    /// ```
    /// use studio_client::StudioClient;
    ///
    /// let client = StudioClient::new("http://localhost:8000");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the orchestrator
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check that the orchestrator is up
    pub async fn health(&self) -> Result<()> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::api_error(status.as_u16(), "health check failed"));
        }
        Ok(())
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// Error bodies are unpacked so the message names the offending fields.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::debug!("API error {}: {}", status, error_text);
            return Err(ClientError::api_error(
                status.as_u16(),
                describe_error(&error_text),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}

fn describe_error(text: &str) -> String {
    match serde_json::from_str::<ErrorBody>(text) {
        Ok(body) if body.fields.is_empty() => match body.job_id {
            Some(job_id) => format!("{} (job {})", body.error, job_id),
            None => body.error,
        },
        Ok(body) => body
            .fields
            .iter()
            .map(|f| format!("{}: {}", f.field, f.message))
            .collect::<Vec<_>>()
            .join("; "),
        Err(_) => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = StudioClient::new("http://localhost:8000");
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = StudioClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_describe_error_lists_fields() {
        let text = r#"{"error":"invalid input","kind":"validation_error","fields":[
            {"field":"tempo_bpm","message":"must be between 20 and 300"},
            {"field":"duration_sec","message":"must be between 5 and 1200"}]}"#;
        assert_eq!(
            describe_error(text),
            "tempo_bpm: must be between 20 and 300; duration_sec: must be between 5 and 1200"
        );
    }

    #[test]
    fn test_describe_error_keeps_job_id() {
        let text = r#"{"error":"unsupported or corrupt audio asset 'a.wav'","kind":"engine_failure",
            "job_id":"00000000-0000-0000-0000-000000000000"}"#;
        assert!(describe_error(text).contains("job 00000000"));
        assert_eq!(describe_error("plain text"), "plain text");
    }
}
