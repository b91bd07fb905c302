//! Credential storage.
//!
//! The API key is the only durable state: one JSON file under the user
//! config directory (0600 on Unix), loaded at startup and written when the
//! user saves a key.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Capability interface for credential persistence, so callers and tests do
/// not depend on a specific storage substrate.
pub trait KeyStore {
    /// The stored key, or None if absent or unreadable.
    fn load(&self) -> Option<String>;
    /// Persist the key.
    fn save(&self, key: &str) -> Result<(), String>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredCredential {
    api_key: String,
}

/// File-backed [`KeyStore`].
#[derive(Debug, Clone)]
pub struct FileKeyStore {
    path: PathBuf,
}

/// Default location of the credentials file.
pub fn credentials_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|c| c.join("sudokai/credentials.json"))
}

impl FileKeyStore {
    /// Store at the default per-user location.
    pub fn new() -> Result<Self, String> {
        let path = credentials_file_path().ok_or("Could not determine config directory")?;
        Ok(Self { path })
    }

    /// Store at an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Delete the stored credential, if any.
    pub fn delete(&self) -> Result<(), String> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .map_err(|e| format!("Failed to delete credentials file: {}", e))?;
        }
        Ok(())
    }
}

impl KeyStore for FileKeyStore {
    fn load(&self) -> Option<String> {
        let contents = std::fs::read_to_string(&self.path).ok()?;
        let stored: StoredCredential = serde_json::from_str(&contents).ok()?;
        Some(stored.api_key)
    }

    fn save(&self, key: &str) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let stored = StoredCredential {
            api_key: key.to_string(),
        };
        let contents = serde_json::to_string_pretty(&stored)
            .map_err(|e| format!("Failed to serialize credentials: {}", e))?;

        std::fs::write(&self.path, &contents)
            .map_err(|e| format!("Failed to write credentials file: {}", e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, permissions)
                .map_err(|e| format!("Failed to set file permissions: {}", e))?;
        }

        Ok(())
    }
}
