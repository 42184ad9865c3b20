//! Stored API token
//!
//! The CLI keeps exactly one credential: a bearer token string in
//! `~/.x07/token`.

use camino::Utf8PathBuf;
use x07_core::error::ApiError;

use crate::settings::x07_home;
use crate::ConfigResult;

/// Single-value token file
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: Utf8PathBuf,
}

impl TokenStore {
    pub fn new(path: Utf8PathBuf) -> Self {
        Self { path }
    }

    /// Store at `~/.x07/token`
    pub fn global() -> ConfigResult<Self> {
        Ok(Self::new(x07_home()?.join("token")))
    }

    pub fn path(&self) -> &Utf8PathBuf {
        &self.path
    }

    /// Load the stored token; blank files count as no token
    pub async fn load(&self) -> ConfigResult<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| ApiError::unknown(format!("failed to read {}: {}", self.path, e)))?;
        let token = raw.trim();
        Ok((!token.is_empty()).then(|| token.to_string()))
    }

    /// Persist a token, trimmed. Blank tokens are rejected.
    pub async fn store(&self, token: &str) -> ConfigResult<()> {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(ApiError::invalid_input("token must be non-empty"));
        }

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ApiError::unknown(format!("failed to create {}: {}", parent, e)))?;
        }
        tokio::fs::write(&self.path, trimmed)
            .await
            .map_err(|e| ApiError::unknown(format!("failed to write {}: {}", self.path, e)))
    }

    /// Remove the stored token. Succeeds when nothing is stored.
    pub async fn clear(&self) -> ConfigResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ApiError::unknown(format!(
                "failed to remove {}: {}",
                self.path, e
            ))),
        }
    }
}
