//! Authorization request for the implicit-grant flow.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AuthError, Result};

/// Neato Beehive authorization endpoint.
pub const DEFAULT_AUTHORIZE_URL: &str = "https://apps.neatorobotics.com/oauth2/authorize";

/// Permissions an application can request from the robot cloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Read,
    Write,
    ControlRobots,
}

impl Scope {
    /// Wire name of the scope.
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Read => "read",
            Scope::Write => "write",
            Scope::ControlRobots => "control_robots",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "read" => Ok(Scope::Read),
            "write" => Ok(Scope::Write),
            "control_robots" => Ok(Scope::ControlRobots),
            other => Err(AuthError::Config(format!("Unknown OAuth scope: {}", other))),
        }
    }
}

/// OAuth client settings for the implicit-grant flow.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub authorize_url: String,
    pub redirect_uri: String,
    pub scopes: Vec<Scope>,
}

impl OAuthConfig {
    /// Create a config against the default Neato authorization endpoint.
    pub fn new(client_id: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            authorize_url: DEFAULT_AUTHORIZE_URL.to_string(),
            redirect_uri: redirect_uri.into(),
            scopes: vec![Scope::Read, Scope::ControlRobots],
        }
    }

    /// Replace the requested scopes.
    pub fn with_scopes(mut self, scopes: Vec<Scope>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Space-separated scope list as sent to the server.
    pub fn scope_param(&self) -> String {
        self.scopes
            .iter()
            .map(Scope::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Build the URL the user must open to sign in.
///
/// The server answers with a redirect to `redirect_uri` carrying the token
/// in the fragment, which [`parse_redirect`](crate::parse_redirect) reads.
pub fn build_authorization_url(config: &OAuthConfig) -> String {
    let scope = config.scope_param();
    let params = [
        ("client_id", config.client_id.as_str()),
        ("scope", scope.as_str()),
        ("response_type", "token"),
        ("redirect_uri", config.redirect_uri.as_str()),
    ];

    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}?{}", config.authorize_url, query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_names() {
        assert_eq!(Scope::Read.to_string(), "read");
        assert_eq!(Scope::Write.to_string(), "write");
        assert_eq!(Scope::ControlRobots.to_string(), "control_robots");
    }

    #[test]
    fn test_scope_from_str() {
        assert_eq!("control_robots".parse::<Scope>().unwrap(), Scope::ControlRobots);
        assert!("admin".parse::<Scope>().is_err());
    }

    #[test]
    fn test_authorization_url() {
        let config = OAuthConfig::new("my-client", "app://callback")
            .with_scopes(vec![Scope::Read, Scope::Write, Scope::ControlRobots]);
        let url = build_authorization_url(&config);

        assert!(url.starts_with("https://apps.neatorobotics.com/oauth2/authorize?"));
        assert!(url.contains("client_id=my-client"));
        assert!(url.contains("scope=read%20write%20control_robots"));
        assert!(url.contains("response_type=token"));
        assert!(url.contains("redirect_uri=app%3A%2F%2Fcallback"));
    }

    #[test]
    fn test_authorization_url_custom_endpoint() {
        let mut config = OAuthConfig::new("c", "app://cb");
        config.authorize_url = "http://localhost:9000/authorize".to_string();
        let url = build_authorization_url(&config);
        assert!(url.starts_with("http://localhost:9000/authorize?client_id=c&"));
    }

    #[test]
    fn test_default_scopes() {
        let config = OAuthConfig::new("c", "app://cb");
        assert_eq!(config.scope_param(), "read control_robots");
    }
}
