//! CLI command handlers.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use chrono::TimeDelta;
use neato_auth::backend::TOKEN_FILE;
use neato_auth::{FileBackend, OAuthConfig, Scope, TokenStore};
use neato_config::NeatoConfig;

pub mod auth;
pub mod config;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Merged configuration.
    pub config: NeatoConfig,
    /// Config files that were loaded, lowest precedence first.
    pub sources: Vec<PathBuf>,
    /// User config directory; also holds the token file and logs by default.
    pub config_dir: PathBuf,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Where the access token is persisted.
    pub fn token_path(&self) -> PathBuf {
        self.config
            .token_file()
            .cloned()
            .unwrap_or_else(|| self.config_dir.join(TOKEN_FILE))
    }

    /// Token store backed by the configured token file.
    pub fn token_store(&self) -> Result<TokenStore<FileBackend>> {
        let secs = self.config.safety_margin_secs();
        let margin = i64::try_from(secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .with_context(|| format!("safety_margin_secs out of range: {}", secs))?;

        let backend = FileBackend::with_path(self.token_path()).with_safety_margin(margin);
        Ok(TokenStore::new(backend))
    }

    /// OAuth client settings for building the sign-in URL.
    pub fn oauth_config(&self) -> Result<OAuthConfig> {
        let client_id = self.config.client_id().ok_or_else(|| {
            anyhow::anyhow!(
                "No client_id configured. Add it to the [oauth] section of {}",
                self.config_dir.join("config.toml").display()
            )
        })?;

        let scopes = self
            .config
            .scopes()
            .iter()
            .map(|s| s.parse::<Scope>())
            .collect::<neato_auth::Result<Vec<_>>>()?;

        let mut oauth = OAuthConfig::new(client_id, self.config.redirect_uri()).with_scopes(scopes);
        if let Some(url) = self.config.authorize_url() {
            oauth.authorize_url = url.to_string();
        }
        Ok(oauth)
    }
}
