//! Error types for token storage.
//!
//! Redirect parsing has no error type: every malformed redirect becomes
//! [`AuthResult::Invalid`](crate::AuthResult::Invalid) and a server-reported
//! failure becomes [`AuthResult::Error`](crate::AuthResult::Error).

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors surfaced by [`TokenStore`](crate::TokenStore) and its backends.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// An empty access token was handed to the store.
    #[error("Access token must not be empty")]
    EmptyToken,

    /// The backend could not persist or remove the token.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The stored token could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration value.
    #[error("Config error: {0}")]
    Config(String),
}
