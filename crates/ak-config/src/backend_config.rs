use crate::{ConfigError, ConfigErrorResult};

use serde::Deserialize;

/// Hosted backend endpoint. Both values are mandatory: the client cannot
/// start without them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Project base URL, e.g. "https://abcd.example.co"
    pub url: String,
    /// Public (anon) API key sent with every request
    pub anon_key: String,
}

impl BackendConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.url.is_empty() {
            return Err(ConfigError::backend(
                "backend.url is required (set AK_BACKEND_URL or backend.url in config.toml)",
            ));
        }

        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(ConfigError::backend(format!(
                "backend.url must be an http(s) URL, got {}",
                self.url
            )));
        }

        if self.anon_key.is_empty() {
            return Err(ConfigError::backend(
                "backend.anon_key is required (set AK_BACKEND_ANON_KEY or backend.anon_key in config.toml)",
            ));
        }

        Ok(())
    }
}
