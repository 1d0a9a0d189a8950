//! Client configuration

use std::time::Duration;

use crate::error::{ActiniaError, Result};

/// Configuration for an actinia client
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Instance address, always ending in `/`
    pub base_url: String,
    /// User name for HTTP basic auth
    pub username: Option<String>,
    /// Password for HTTP basic auth
    pub password: Option<String>,
    /// API path prefix (default: latest)
    pub api_version: String,
    /// Request timeout handed to the transport, none by default
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(base_url.into()),
            username: None,
            password: None,
            api_version: "latest".to_string(),
            timeout: None,
        }
    }

    /// Read the configuration from `ACTINIA_URL`, `ACTINIA_USER`, `ACTINIA_PASSWORD`
    /// and the optional `ACTINIA_API_VERSION`.
    pub fn from_env() -> Result<Self> {
        let url = std::env::var("ACTINIA_URL")
            .map_err(|_| ActiniaError::Config("ACTINIA_URL is not set".to_string()))?;
        if url.trim().is_empty() {
            return Err(ActiniaError::Config("ACTINIA_URL is empty".to_string()));
        }

        let mut config = Self::new(url);
        config.username = std::env::var("ACTINIA_USER").ok();
        config.password = std::env::var("ACTINIA_PASSWORD").ok();
        if let Ok(version) = std::env::var("ACTINIA_API_VERSION") {
            config.api_version = version;
        }
        Ok(config)
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Joins `path` onto `{base_url}{api_version}/`.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}/{}", self.base_url, self.api_version, path)
    }
}

fn normalize_base_url(url: String) -> String {
    if url.ends_with('/') {
        url
    } else {
        url + "/"
    }
}
