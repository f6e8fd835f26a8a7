//! Authorization redirect parsing.
//!
//! The authorization server returns its answer in the fragment of the
//! redirect URI, e.g.
//!
//! ```text
//! app://callback#access_token=abc&expires_in=3600
//! app://callback#error=access_denied&error_description=User%20cancelled
//! ```
//!
//! [`parse_redirect`] is total: anything that is not a well-formed answer
//! comes back as [`AuthResult::Invalid`].

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::expiry::{expiry_from_seconds, fallback_expiry};

const ACCESS_TOKEN: &str = "access_token";
const EXPIRES_IN: &str = "expires_in";
const ERROR: &str = "error";
const ERROR_DESCRIPTION: &str = "error_description";

/// Outcome of an authorization redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthResult {
    /// The user signed in. `access_token` is never empty.
    ///
    /// `expires_at` is `None` when the server did not send `expires_in`;
    /// callers should then apply [`fallback_expiry`] themselves.
    Token {
        access_token: String,
        expires_at: Option<DateTime<Utc>>,
    },

    /// The server refused the request.
    Error {
        code: String,
        description: Option<String>,
    },

    /// The redirect could not be understood.
    Invalid,
}

impl AuthResult {
    /// Parse a redirect using the current wall-clock time.
    pub fn from_uri(uri: Option<&str>) -> Self {
        parse_redirect(uri, Utc::now())
    }

    /// Short name of the variant, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthResult::Token { .. } => "token",
            AuthResult::Error { .. } => "error",
            AuthResult::Invalid => "invalid",
        }
    }

    /// The access token, if this is a successful result.
    pub fn access_token(&self) -> Option<&str> {
        match self {
            AuthResult::Token { access_token, .. } => Some(access_token),
            _ => None,
        }
    }
}

/// Classify an authorization redirect URI.
///
/// `now` anchors the token lifetime. Parameters are read from the fragment
/// only; a URI without one is invalid.
pub fn parse_redirect(uri: Option<&str>, now: DateTime<Utc>) -> AuthResult {
    let result = classify(uri, now);
    tracing::debug!(result = result.kind(), "Parsed authorization redirect");
    result
}

fn classify(uri: Option<&str>, now: DateTime<Utc>) -> AuthResult {
    let Some(fragment) = uri.and_then(fragment_of) else {
        return AuthResult::Invalid;
    };
    let Some(params) = split_fragment(fragment) else {
        return AuthResult::Invalid;
    };

    if let Some(token) = lookup(&params, ACCESS_TOKEN).filter(|t| !t.is_empty()) {
        let expires_at = lookup(&params, EXPIRES_IN).map(|raw| expiry_for(raw, now));
        return AuthResult::Token {
            access_token: token.to_string(),
            expires_at,
        };
    }

    if let Some(code) = lookup(&params, ERROR) {
        return AuthResult::Error {
            code: code.to_string(),
            description: lookup(&params, ERROR_DESCRIPTION).map(str::to_string),
        };
    }

    AuthResult::Invalid
}

/// Everything after the first `#`, if non-empty.
fn fragment_of(uri: &str) -> Option<&str> {
    uri.split_once('#')
        .map(|(_, fragment)| fragment)
        .filter(|fragment| !fragment.is_empty())
}

/// Decoded `key=value` pairs in order of appearance.
///
/// Pairs without `=` are skipped. A single undecodable component rejects
/// the whole fragment.
fn split_fragment(fragment: &str) -> Option<Vec<(String, String)>> {
    fragment
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(key, value)| Some((decode_component(key)?, decode_component(value)?)))
        .collect()
}

/// Value of `key`; a repeated key resolves to its last occurrence.
fn lookup<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .rev()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn expiry_for(raw: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    // Lifetimes are 32-bit; anything wider counts as unreadable.
    let secs = raw.parse::<i32>().ok().map(i64::from);
    match secs.and_then(|secs| expiry_from_seconds(now, secs)) {
        Some(expires_at) => expires_at,
        None => {
            tracing::warn!(
                expires_in = raw,
                "Unreadable token lifetime, assuming one month"
            );
            fallback_expiry(now)
        }
    }
}

/// Form-style percent decoding: `+` is a space, `%XX` must be well formed
/// and the decoded bytes must be UTF-8.
fn decode_component(raw: &str) -> Option<String> {
    let spaced: Cow<'_, str> = if raw.contains('+') {
        Cow::Owned(raw.replace('+', " "))
    } else {
        Cow::Borrowed(raw)
    };
    if !escapes_well_formed(&spaced) {
        return None;
    }
    urlencoding::decode(&spaced).ok().map(Cow::into_owned)
}

// `urlencoding::decode` passes malformed escapes through unchanged.
fn escapes_well_formed(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            match bytes.get(i + 1..i + 3) {
                Some(hex) if hex.iter().all(u8::is_ascii_hexdigit) => i += 3,
                _ => return false,
            }
        } else {
            i += 1;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        "2024-01-01T00:00:00Z".parse().unwrap()
    }

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn parse(uri: &str) -> AuthResult {
        parse_redirect(Some(uri), now())
    }

    #[test]
    fn test_token_with_lifetime() {
        assert_eq!(
            parse("app://callback#access_token=tok1&expires_in=3600"),
            AuthResult::Token {
                access_token: "tok1".to_string(),
                expires_at: Some(at("2024-01-01T01:00:00Z")),
            }
        );
    }

    #[test]
    fn test_token_without_lifetime_leaves_expiry_unset() {
        assert_eq!(
            parse("app://callback#access_token=tok1"),
            AuthResult::Token {
                access_token: "tok1".to_string(),
                expires_at: None,
            }
        );
    }

    #[test]
    fn test_unreadable_lifetime_falls_back_to_one_month() {
        for raw in ["soon", "", "36.5", "99999999999999999999999"] {
            let uri = format!("app://callback#access_token=tok1&expires_in={}", raw);
            assert_eq!(
                parse(&uri),
                AuthResult::Token {
                    access_token: "tok1".to_string(),
                    expires_at: Some(at("2024-02-01T00:00:00Z")),
                },
                "expires_in={:?}",
                raw
            );
        }
    }

    #[test]
    fn test_lifetime_beyond_32_bits_falls_back() {
        for raw in ["2147483648", "-2147483649", "9999999999"] {
            let uri = format!("app://cb#access_token=t&expires_in={}", raw);
            assert_eq!(
                parse(&uri),
                AuthResult::Token {
                    access_token: "t".to_string(),
                    expires_at: Some(at("2024-02-01T00:00:00Z")),
                },
                "expires_in={:?}",
                raw
            );
        }
    }

    #[test]
    fn test_largest_32_bit_lifetime_is_used() {
        let result = parse("app://cb#access_token=t&expires_in=2147483647");
        assert_eq!(
            result,
            AuthResult::Token {
                access_token: "t".to_string(),
                expires_at: Some(at("2092-01-19T03:14:07Z")),
            }
        );
    }

    #[test]
    fn test_fallback_at_month_end() {
        let result = parse_redirect(
            Some("app://callback#access_token=t&expires_in=never"),
            at("2024-01-31T12:00:00Z"),
        );
        assert_eq!(
            result,
            AuthResult::Token {
                access_token: "t".to_string(),
                expires_at: Some(at("2024-02-29T12:00:00Z")),
            }
        );
    }

    #[test]
    fn test_error_with_description() {
        assert_eq!(
            parse("app://callback#error=access_denied&error_description=User%20cancelled"),
            AuthResult::Error {
                code: "access_denied".to_string(),
                description: Some("User cancelled".to_string()),
            }
        );
    }

    #[test]
    fn test_error_without_description() {
        assert_eq!(
            parse("app://callback#error=server_error"),
            AuthResult::Error {
                code: "server_error".to_string(),
                description: None,
            }
        );
    }

    #[test]
    fn test_token_wins_over_error() {
        let result = parse("app://callback#error=access_denied&access_token=tok1");
        assert_eq!(result.access_token(), Some("tok1"));
    }

    #[test]
    fn test_missing_input_is_invalid() {
        assert_eq!(parse_redirect(None, now()), AuthResult::Invalid);
        assert_eq!(parse(""), AuthResult::Invalid);
    }

    #[test]
    fn test_no_fragment_is_invalid() {
        assert_eq!(parse("app://callback"), AuthResult::Invalid);
        assert_eq!(
            parse("app://callback?access_token=tok1&expires_in=3600"),
            AuthResult::Invalid
        );
    }

    #[test]
    fn test_empty_fragment_is_invalid() {
        assert_eq!(parse("app://callback#"), AuthResult::Invalid);
    }

    #[test]
    fn test_unknown_keys_are_invalid() {
        assert_eq!(parse("app://callback#state=xyz&foo=bar"), AuthResult::Invalid);
    }

    #[test]
    fn test_empty_access_token_is_not_a_token() {
        assert_eq!(parse("app://callback#access_token="), AuthResult::Invalid);
        assert_eq!(
            parse("app://callback#access_token=&error=bad"),
            AuthResult::Error {
                code: "bad".to_string(),
                description: None,
            }
        );
    }

    #[test]
    fn test_pairs_without_separator_are_dropped() {
        assert_eq!(
            parse("app://callback#bearer&access_token=tok1&expires_in=60"),
            AuthResult::Token {
                access_token: "tok1".to_string(),
                expires_at: Some(at("2024-01-01T00:01:00Z")),
            }
        );
    }

    #[test]
    fn test_value_split_on_first_equals() {
        assert_eq!(
            parse("app://callback#access_token=abc==").access_token(),
            Some("abc==")
        );
    }

    #[test]
    fn test_percent_decoding_of_keys_and_values() {
        let pairs = split_fragment("key%3Dval=abc%26def&a+b=c%2Bd").unwrap();
        assert_eq!(
            pairs,
            vec![
                ("key=val".to_string(), "abc&def".to_string()),
                ("a b".to_string(), "c+d".to_string()),
            ]
        );
    }

    #[test]
    fn test_utf8_decoding() {
        let result = parse("app://callback#error=denied&error_description=Caf%C3%A9");
        assert_eq!(
            result,
            AuthResult::Error {
                code: "denied".to_string(),
                description: Some("Café".to_string()),
            }
        );
    }

    #[test]
    fn test_decoding_failure_rejects_whole_redirect() {
        assert_eq!(
            parse("app://callback#access_token=tok1&junk=%zz"),
            AuthResult::Invalid
        );
        assert_eq!(
            parse("app://callback#access_token=tok1&junk=%4"),
            AuthResult::Invalid
        );
        assert_eq!(
            parse("app://callback#access_token=tok1&junk=%FF"),
            AuthResult::Invalid
        );
    }

    #[test]
    fn test_everything_after_first_hash_is_fragment() {
        assert_eq!(
            parse("app://callback#access_token=a#b").access_token(),
            Some("a#b")
        );
    }

    #[test]
    fn test_repeated_key_uses_last_value() {
        assert_eq!(
            parse("app://callback#access_token=first&access_token=second").access_token(),
            Some("second")
        );
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(parse("app://cb#access_token=t").kind(), "token");
        assert_eq!(parse("app://cb#error=e").kind(), "error");
        assert_eq!(AuthResult::Invalid.kind(), "invalid");
    }

    #[test]
    fn test_serializes_with_type_tag() {
        let json = serde_json::to_value(parse("app://cb#error=e")).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["code"], "e");
    }
}
