//! Configuration types.
//!
//! ```toml
//! [oauth]
//! client_id = "0123456789abcdef"
//! redirect_uri = "marco-app://neato"
//! scopes = ["read", "control_robots"]
//!
//! [storage]
//! token_file = "/var/lib/neato/token.json"
//! safety_margin_secs = 300
//! ```
//!
//! Every field is optional so that layers can be merged; accessors supply
//! the defaults.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default redirect URI registered for SDK applications.
pub const DEFAULT_REDIRECT_URI: &str = "neato-sdk://callback";

/// Default scopes requested at sign-in.
pub const DEFAULT_SCOPES: &[&str] = &["read", "control_robots"];

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NeatoConfig {
    /// OAuth client settings.
    pub oauth: Option<OAuthSection>,

    /// Token persistence settings.
    pub storage: Option<StorageSection>,
}

/// `[oauth]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OAuthSection {
    /// Client id issued to the application. Required to sign in.
    pub client_id: Option<String>,

    /// Where the authorization server redirects after sign-in.
    pub redirect_uri: Option<String>,

    /// Override for the authorization endpoint (e.g. a staging server).
    pub authorize_url: Option<String>,

    /// Requested scopes by wire name.
    pub scopes: Option<Vec<String>>,
}

/// `[storage]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageSection {
    /// Token file location. Defaults to a file in the config directory.
    pub token_file: Option<PathBuf>,

    /// Seconds before expiry at which a token stops counting as valid.
    pub safety_margin_secs: Option<u64>,
}

impl NeatoConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> crate::Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> crate::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    pub fn merge(&mut self, other: NeatoConfig) {
        if let Some(oauth) = other.oauth {
            self.oauth.get_or_insert_with(OAuthSection::default).merge(oauth);
        }
        if let Some(storage) = other.storage {
            self.storage
                .get_or_insert_with(StorageSection::default)
                .merge(storage);
        }
    }

    pub fn client_id(&self) -> Option<&str> {
        self.oauth.as_ref()?.client_id.as_deref()
    }

    pub fn redirect_uri(&self) -> &str {
        self.oauth
            .as_ref()
            .and_then(|o| o.redirect_uri.as_deref())
            .unwrap_or(DEFAULT_REDIRECT_URI)
    }

    pub fn authorize_url(&self) -> Option<&str> {
        self.oauth.as_ref()?.authorize_url.as_deref()
    }

    pub fn scopes(&self) -> Vec<String> {
        self.oauth
            .as_ref()
            .and_then(|o| o.scopes.clone())
            .unwrap_or_else(|| DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect())
    }

    pub fn token_file(&self) -> Option<&PathBuf> {
        self.storage.as_ref()?.token_file.as_ref()
    }

    pub fn safety_margin_secs(&self) -> u64 {
        self.storage
            .as_ref()
            .and_then(|s| s.safety_margin_secs)
            .unwrap_or(0)
    }
}

impl OAuthSection {
    fn merge(&mut self, other: OAuthSection) {
        if other.client_id.is_some() {
            self.client_id = other.client_id;
        }
        if other.redirect_uri.is_some() {
            self.redirect_uri = other.redirect_uri;
        }
        if other.authorize_url.is_some() {
            self.authorize_url = other.authorize_url;
        }
        if other.scopes.is_some() {
            self.scopes = other.scopes;
        }
    }
}

impl StorageSection {
    fn merge(&mut self, other: StorageSection) {
        if other.token_file.is_some() {
            self.token_file = other.token_file;
        }
        if other.safety_margin_secs.is_some() {
            self.safety_margin_secs = other.safety_margin_secs;
        }
    }
}
