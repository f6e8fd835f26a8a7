//! OAuth 2.0 implicit-grant authentication for the Neato robot cloud.
//!
//! The SDK signs users in by opening the Neato authorization page in a
//! browser or webview. The authorization server redirects back with the
//! access token (or an error) in the URI fragment. This crate turns that
//! redirect into a typed result and keeps the token around between runs.
//!
//! # Components
//!
//! - [`authorize`] — scopes and the authorization URL the user is sent to
//! - [`redirect`] — redirect URI parsing into an [`AuthResult`]
//! - [`expiry`] — token lifetime computation and the one-month fallback
//! - [`token_store`] — [`TokenStore`] over a pluggable [`TokenBackend`]
//! - [`backend`] — in-memory and JSON-file backends

pub mod authorize;
pub mod backend;
pub mod error;
pub mod expiry;
pub mod redirect;
pub mod token_store;

pub use authorize::{OAuthConfig, Scope, build_authorization_url};
pub use backend::{FileBackend, MemoryBackend, StoredToken, TokenInfo};
pub use error::{AuthError, Result};
pub use expiry::{expiry_from_seconds, fallback_expiry};
pub use redirect::{AuthResult, parse_redirect};
pub use token_store::{TokenBackend, TokenStore};
