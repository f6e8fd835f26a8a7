//! Access-token lifecycle.
//!
//! [`TokenStore`] holds no token of its own. Persistence and the decision
//! whether the stored token is still usable both belong to the
//! [`TokenBackend`] supplied by the host application.
//!
//! Mutating calls take `&mut self`: a store shared between threads must be
//! wrapped in a lock by the caller, since backends do not promise that
//! `store`/`clear` are atomic with respect to `load`/`is_token_valid`.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::error::{AuthError, Result};
use crate::expiry::fallback_expiry;
use crate::redirect::AuthResult;

// ============================================================================
// TokenBackend Trait
// ============================================================================

/// Persistence for a single access token.
pub trait TokenBackend: fmt::Debug {
    /// Persist `token`, replacing whatever was stored before.
    fn store(&mut self, token: &str, expires_at: DateTime<Utc>) -> Result<()>;

    /// The stored token, if any.
    fn load(&self) -> Option<String>;

    /// Forget the stored token. Clearing an empty backend is not an error.
    fn clear(&mut self) -> Result<()>;

    /// Whether the stored token may still be used.
    ///
    /// Backends may apply their own policy here, such as a safety margin
    /// before the literal expiry instant.
    fn is_token_valid(&self) -> bool;
}

impl<B: TokenBackend + ?Sized> TokenBackend for Box<B> {
    fn store(&mut self, token: &str, expires_at: DateTime<Utc>) -> Result<()> {
        (**self).store(token, expires_at)
    }

    fn load(&self) -> Option<String> {
        (**self).load()
    }

    fn clear(&mut self) -> Result<()> {
        (**self).clear()
    }

    fn is_token_valid(&self) -> bool {
        (**self).is_token_valid()
    }
}

// ============================================================================
// TokenStore
// ============================================================================

/// Token lifecycle over a pluggable backend.
#[derive(Debug)]
pub struct TokenStore<B = Box<dyn TokenBackend>> {
    backend: B,
}

impl<B: TokenBackend> TokenStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Store a freshly obtained token.
    pub fn set_token(&mut self, token: &str, expires_at: DateTime<Utc>) -> Result<()> {
        if token.is_empty() {
            return Err(AuthError::EmptyToken);
        }
        self.backend.store(token, expires_at)?;
        tracing::info!(%expires_at, "Access token stored");
        Ok(())
    }

    pub fn get_token(&self) -> Option<String> {
        self.backend.load()
    }

    /// Whether a usable token is stored, as judged by the backend.
    pub fn is_authenticated(&self) -> bool {
        self.backend.is_token_valid()
    }

    /// Sign out. Safe to call when nothing is stored.
    pub fn clear(&mut self) -> Result<()> {
        self.backend.clear()?;
        tracing::info!("Access token cleared");
        Ok(())
    }

    /// Store the token carried by a redirect result.
    ///
    /// A token without a lifetime gets [`fallback_expiry`] from `now`.
    /// Returns `false` without touching the backend for error and invalid
    /// results.
    pub fn commit(&mut self, result: &AuthResult, now: DateTime<Utc>) -> Result<bool> {
        match result {
            AuthResult::Token {
                access_token,
                expires_at,
            } => {
                let expires_at = match expires_at {
                    Some(at) => *at,
                    None => {
                        tracing::debug!("Server sent no token lifetime, assuming one month");
                        fallback_expiry(now)
                    }
                };
                self.set_token(access_token, expires_at)?;
                Ok(true)
            }
            AuthResult::Error { .. } | AuthResult::Invalid => Ok(false),
        }
    }
}
