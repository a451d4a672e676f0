//! Device Storage Module
//!
//! Plain string key/value storage persisted as one file per key, re-read on
//! every access so a value cleared by one component is immediately gone for all.

use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Auth token issued by `/api/auth/login`.
pub const TOKEN_KEY: &str = "token";
pub const USER_ID_KEY: &str = "userId";
pub const USERNAME_KEY: &str = "username";
pub const THEME_MODE_KEY: &str = "@mottu_theme_mode";
pub const LANGUAGE_KEY: &str = "appLanguage";

/// Key/value storage rooted at a directory
#[derive(Debug, Clone)]
pub struct DeviceStorage {
    storage_path: PathBuf,
}

impl DeviceStorage {
    /// Open (and create if needed) storage under `dir`
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let storage_path = dir.as_ref().join("storage");
        std::fs::create_dir_all(&storage_path).map_err(|e| {
            error!("Failed to create storage directory: {}", e);
            StorageError::Io(e.to_string())
        })?;

        debug!("Device storage initialized at: {:?}", storage_path);

        Ok(Self { storage_path })
    }

    /// Read a value; a missing key is `Ok(None)`
    pub fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let file_path = self.file_path(key);
        match std::fs::read_to_string(&file_path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e.to_string())),
        }
    }

    /// Write a value, replacing any previous one
    pub fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        std::fs::write(self.file_path(key), value).map_err(|e| StorageError::Io(e.to_string()))?;
        debug!("Stored value for key: {}", key);
        Ok(())
    }

    /// Delete a value. Deleting a missing key is not an error.
    pub fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let file_path = self.file_path(key);

        if file_path.exists() {
            std::fs::remove_file(&file_path).map_err(|e| StorageError::Io(e.to_string()))?;
            info!("Deleted stored data for key: {}", key);
        }

        Ok(())
    }

    /// Delete several keys; every key is attempted and the first failure is reported
    pub fn multi_remove(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut first_err = None;
        for key in keys {
            if let Err(e) = self.remove_item(key) {
                error!("Failed to remove {}: {}", key, e);
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    pub fn exists(&self, key: &str) -> bool {
        self.file_path(key).exists()
    }

    fn file_path(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.storage_path.join(format!("{}.dat", name))
    }
}

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Invalid storage key: '{0}'")]
    InvalidKey(String),
}
