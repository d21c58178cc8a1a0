//! Configuration structures for Brightbox API clients.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;
use validator::Validate;

/// Default API endpoint for the gb1 region.
pub const DEFAULT_API_URL: &str = "https://api.gb1.brightbox.com";

/// API version spoken by this client.
pub const DEFAULT_API_VERSION: &str = "1.0";

/// Configuration for a Brightbox API client instance.
///
/// Controls which endpoint and API version requests are issued against and
/// how long to wait for responses.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BrightboxConfig {
    /// API base URL
    #[validate(url)]
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// API version used as the leading path segment of every request
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

const fn default_request_timeout_secs() -> u64 {
    30
}

impl BrightboxConfig {
    /// Create a configuration pointing at the default gb1 endpoint.
    #[must_use]
    pub fn new() -> Self {
        Self {
            api_url: default_api_url(),
            api_version: default_api_version(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }

    /// Set the API base URL.
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Set the API version path segment.
    #[must_use]
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Parse and validate the API base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn parse_api_url(&self) -> Result<Url, Error> {
        Url::parse(&self.api_url)
            .map_err(|e| Error::Config(format!("Invalid API URL: {e}")))
    }
}

impl Default for BrightboxConfig {
    fn default() -> Self {
        Self::new()
    }
}
