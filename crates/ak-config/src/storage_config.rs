use crate::{ConfigError, ConfigErrorResult, DEFAULT_SESSION_FILENAME};

use serde::Deserialize;

/// Local session persistence.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Session file path, relative to the config directory
    pub session_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            session_file: String::from(DEFAULT_SESSION_FILENAME),
        }
    }
}

impl StorageConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        let path = std::path::Path::new(&self.session_file);
        if path.is_absolute() || self.session_file.contains("..") {
            return Err(ConfigError::storage(
                "storage.session_file must be relative and cannot contain '..'",
            ));
        }

        Ok(())
    }
}
