//! Application configuration types for Complyx.
//!
//! `AppConfig` represents the top-level `config.toml` controlling the
//! backend URL and HTTP client behavior. All fields have defaults so a
//! missing file means a working local setup.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the Complyx client.
///
/// Loaded from `{data_dir}/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the assessment backend.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Uniform retry count applied to every backend call.
    #[serde(default = "default_request_retries")]
    pub request_retries: u32,
}

fn default_api_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_request_retries() -> u32 {
    2
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout_secs(),
            request_retries: default_request_retries(),
        }
    }
}
