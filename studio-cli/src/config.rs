//! Configuration module
//!
//! Handles CLI configuration shared by every command.

use studio_client::StudioClient;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the orchestrator service
    pub server_url: String,
}

impl Config {
    pub fn client(&self) -> StudioClient {
        StudioClient::new(&self.server_url)
    }
}
