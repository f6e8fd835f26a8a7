//! Built-in token backends.
//!
//! Both backends treat a token as valid until `expires_at` minus an optional
//! safety margin. Hosts with other needs (OS keychain, remote vault) implement
//! [`TokenBackend`] themselves.

use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, Result};
use crate::token_store::TokenBackend;

/// Default token file name within the data directory.
pub const TOKEN_FILE: &str = "neato-token.json";

// ============================================================================
// StoredToken
// ============================================================================

/// A persisted access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub stored_at: Option<DateTime<Utc>>,
}

impl StoredToken {
    pub fn new(access_token: &str, expires_at: DateTime<Utc>) -> Self {
        Self {
            access_token: access_token.to_string(),
            expires_at,
            stored_at: Some(Utc::now()),
        }
    }

    /// Whether the token is still usable at `now`, keeping `margin` in reserve.
    pub fn is_valid_at(&self, now: DateTime<Utc>, margin: TimeDelta) -> bool {
        self.expires_at
            .checked_sub_signed(margin)
            .is_some_and(|limit| now < limit)
    }

    /// Expiry summary as of `now`.
    pub fn info(&self, now: DateTime<Utc>, margin: TimeDelta) -> TokenInfo {
        let remaining = (self.expires_at - now).num_seconds();
        TokenInfo {
            expires_at: self.expires_at,
            stored_at: self.stored_at,
            expires_in_secs: u64::try_from(remaining).unwrap_or(0),
            is_expired: !self.is_valid_at(now, margin),
        }
    }
}

// ============================================================================
// TokenInfo
// ============================================================================

/// Information about a stored token for display.
#[derive(Debug, Clone, Serialize)]
pub struct TokenInfo {
    pub expires_at: DateTime<Utc>,
    pub stored_at: Option<DateTime<Utc>>,
    pub expires_in_secs: u64,
    pub is_expired: bool,
}

impl TokenInfo {
    pub fn expires_in_display(&self) -> String {
        if self.is_expired {
            "Expired (sign in again)".to_string()
        } else {
            let days = self.expires_in_secs / 86_400;
            let hours = (self.expires_in_secs % 86_400) / 3600;
            let minutes = (self.expires_in_secs % 3600) / 60;
            if days > 0 {
                format!("{}d {}h {}m", days, hours, minutes)
            } else {
                format!("{}h {}m", hours, minutes)
            }
        }
    }
}

// ============================================================================
// MemoryBackend
// ============================================================================

/// In-process backend. Nothing survives a restart.
#[derive(Debug)]
pub struct MemoryBackend {
    token: Option<StoredToken>,
    safety_margin: TimeDelta,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            token: None,
            safety_margin: TimeDelta::zero(),
        }
    }

    /// Treat tokens as expired `margin` before their expiry instant.
    pub fn with_safety_margin(mut self, margin: TimeDelta) -> Self {
        self.safety_margin = margin;
        self
    }

    pub fn stored_token(&self) -> Option<&StoredToken> {
        self.token.as_ref()
    }

    pub fn token_info(&self) -> Option<TokenInfo> {
        self.token
            .as_ref()
            .map(|t| t.info(Utc::now(), self.safety_margin))
    }
}

impl TokenBackend for MemoryBackend {
    fn store(&mut self, token: &str, expires_at: DateTime<Utc>) -> Result<()> {
        self.token = Some(StoredToken::new(token, expires_at));
        Ok(())
    }

    fn load(&self) -> Option<String> {
        self.token.as_ref().map(|t| t.access_token.clone())
    }

    fn clear(&mut self) -> Result<()> {
        self.token = None;
        Ok(())
    }

    fn is_token_valid(&self) -> bool {
        self.token
            .as_ref()
            .is_some_and(|t| t.is_valid_at(Utc::now(), self.safety_margin))
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// FileBackend
// ============================================================================

/// JSON file backend. The token survives process restarts.
#[derive(Debug, Clone)]
pub struct FileBackend {
    token_path: PathBuf,
    safety_margin: TimeDelta,
}

impl FileBackend {
    /// Store the token as [`TOKEN_FILE`] inside `data_dir`.
    pub fn new(data_dir: &Path) -> Self {
        Self::with_path(data_dir.join(TOKEN_FILE))
    }

    /// Create with a custom token path.
    pub fn with_path(token_path: PathBuf) -> Self {
        Self {
            token_path,
            safety_margin: TimeDelta::zero(),
        }
    }

    /// Treat tokens as expired `margin` before their expiry instant.
    pub fn with_safety_margin(mut self, margin: TimeDelta) -> Self {
        self.safety_margin = margin;
        self
    }

    /// Get the token file path.
    pub fn token_path(&self) -> &Path {
        &self.token_path
    }

    /// Read the token file. A missing file is `Ok(None)`.
    pub fn stored_token(&self) -> Result<Option<StoredToken>> {
        if !self.token_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.token_path)
            .map_err(|e| AuthError::Storage(format!("Failed to read token file: {}", e)))?;

        let token: StoredToken = serde_json::from_str(&content)
            .map_err(|e| AuthError::Serialization(format!("Failed to parse token file: {}", e)))?;

        Ok(Some(token))
    }

    pub fn token_info(&self) -> Result<Option<TokenInfo>> {
        Ok(self
            .stored_token()?
            .map(|t| t.info(Utc::now(), self.safety_margin)))
    }

    /// Like [`stored_token`](Self::stored_token) but an unreadable file is
    /// logged and treated as empty.
    fn read_lenient(&self) -> Option<StoredToken> {
        match self.stored_token() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(
                    path = %self.token_path.display(),
                    error = %e,
                    "Ignoring unreadable token file"
                );
                None
            }
        }
    }
}

impl TokenBackend for FileBackend {
    fn store(&mut self, token: &str, expires_at: DateTime<Utc>) -> Result<()> {
        if let Some(parent) = self.token_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AuthError::Storage(format!("Failed to create token directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&StoredToken::new(token, expires_at))
            .map_err(|e| AuthError::Serialization(format!("Failed to serialize token: {}", e)))?;

        std::fs::write(&self.token_path, json)
            .map_err(|e| AuthError::Storage(format!("Failed to write token file: {}", e)))?;

        tracing::debug!("Token saved to {}", self.token_path.display());
        Ok(())
    }

    fn load(&self) -> Option<String> {
        self.read_lenient().map(|t| t.access_token)
    }

    fn clear(&mut self) -> Result<()> {
        match std::fs::remove_file(&self.token_path) {
            Ok(()) => {
                tracing::debug!("Token file {} removed", self.token_path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AuthError::Storage(format!(
                "Failed to delete token file: {}",
                e
            ))),
        }
    }

    fn is_token_valid(&self) -> bool {
        self.read_lenient()
            .is_some_and(|t| t.is_valid_at(Utc::now(), self.safety_margin))
    }
}
