//! On-disk session persistence.
//!
//! Mirrors the mobile client's behavior: the session outlives the process,
//! and a corrupted file means "no session", never a startup failure.

use crate::{ClientError, ClientResult};

use ak_core::Session;

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use log::{info, warn};

pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load the persisted session.
    ///
    /// Returns:
    /// - `Ok(Some(...))` - loaded successfully
    /// - `Ok(None)` - file doesn't exist (first launch) or is corrupted
    pub fn load(&self) -> ClientResult<Option<Session>> {
        if !self.path.exists() {
            info!("No session file at {:?} (first launch)", self.path);
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| ClientError::Storage {
            path: self.path.clone(),
            source: e,
        })?;

        match serde_json::from_str::<Session>(&contents) {
            Ok(session) => {
                info!("Loaded persisted session for {}", session.user.id);
                Ok(Some(session))
            }
            Err(e) => {
                warn!("Session file corrupted at {:?}: {e}", self.path);
                Ok(None)
            }
        }
    }

    /// Save the session using atomic write pattern.
    ///
    /// 1. Writes to temp file
    /// 2. Syncs to disk (fsync)
    /// 3. Atomic rename to final location
    pub fn save(&self, session: &Session) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| ClientError::Storage {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let temp_path = self.path.with_extension(format!("tmp.{}", std::process::id()));
        let json = serde_json::to_string_pretty(session)?;

        {
            let mut file = fs::File::create(&temp_path).map_err(|e| ClientError::Storage {
                path: temp_path.clone(),
                source: e,
            })?;

            file.write_all(json.as_bytes())
                .map_err(|e| ClientError::Storage {
                    path: temp_path.clone(),
                    source: e,
                })?;

            file.sync_all().map_err(|e| ClientError::Storage {
                path: temp_path.clone(),
                source: e,
            })?;
        }

        fs::rename(&temp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            ClientError::Storage {
                path: self.path.clone(),
                source: e,
            }
        })?;

        info!("Persisted session for {}", session.user.id);
        Ok(())
    }

    /// Remove the persisted session, if any.
    pub fn clear(&self) -> ClientResult<()> {
        if !self.path.exists() {
            return Ok(());
        }

        fs::remove_file(&self.path).map_err(|e| ClientError::Storage {
            path: self.path.clone(),
            source: e,
        })
    }
}
