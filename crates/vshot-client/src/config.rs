//! Client configuration.

use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Configuration for the screenshot service client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the screenshot service
    pub base_url: String,
    /// Timeout for status queries and downloads
    pub timeout: Duration,
    /// Timeout for the upload request (large files)
    pub upload_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            upload_timeout: Duration::from_secs(1800), // 500MB over a slow link
        }
    }
}

impl ClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("VSHOT_SERVER_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            timeout: Duration::from_secs(
                std::env::var("VSHOT_HTTP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            upload_timeout: Duration::from_secs(
                std::env::var("VSHOT_UPLOAD_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(1800),
            ),
        }
    }

    /// Override the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Base URL without a trailing slash.
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
