//! Credential acquisition boundary.
//!
//! The authorization-code exchange happens outside this system; the
//! core only consumes a resulting bearer token through
//! [`TokenProvider`] and understands the handshake message a callback
//! page posts back to its opener.

use serde::{Deserialize, Serialize};

/// Source of the bearer credential the remote adapter sends.
pub trait TokenProvider: Send + Sync {
    /// Current token, or `None` when the reviewer is not authenticated.
    fn token(&self) -> Option<String>;
}

impl<F> TokenProvider for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn token(&self) -> Option<String> {
        self()
    }
}

/// Fixed token, for tests and non-interactive embeddings.
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

impl TokenProvider for StaticToken {
    fn token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

const AUTHORIZE_ENDPOINT: &str = "https://github.com/login/oauth/authorize";

#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub callback_url: String,
}

impl OAuthConfig {
    /// URL the embedding opens to start the authorization-code flow.
    pub fn authorize_url(&self) -> String {
        format!(
            "{AUTHORIZE_ENDPOINT}?client_id={}&redirect_uri={}&scope=repo",
            encode_query(&self.client_id),
            encode_query(&self.callback_url)
        )
    }
}

/// Percent-encode a query component (RFC 3986 unreserved set kept).
fn encode_query(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            _ => {
                out.push('%');
                out.push_str(&format!("{byte:02X}"));
            }
        }
    }
    out
}

/// Handshake payload a callback page posts back to the opener after the
/// code exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AuthMessage {
    Token { token: String },
    Error { message: String },
}

impl AuthMessage {
    /// Parse a raw handshake payload. Foreign or malformed messages
    /// yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn authorize_url_encodes_the_callback() {
        let config = OAuthConfig {
            client_id: "abc123".to_string(),
            callback_url: "https://example.com/cb?x=1".to_string(),
        };
        let url = config.authorize_url();
        assert!(url.starts_with("https://github.com/login/oauth/authorize?"));
        assert!(url.contains("client_id=abc123"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fexample.com%2Fcb%3Fx%3D1"));
        assert!(url.ends_with("&scope=repo"));
    }

    #[test]
    fn parses_token_and_error_messages() {
        assert_eq!(
            AuthMessage::parse(r#"{"type":"token","token":"t0"}"#),
            Some(AuthMessage::Token {
                token: "t0".to_string()
            })
        );
        assert_eq!(
            AuthMessage::parse(r#"{"type":"error","message":"denied"}"#),
            Some(AuthMessage::Error {
                message: "denied".to_string()
            })
        );
    }

    #[test]
    fn foreign_messages_yield_none() {
        assert_eq!(AuthMessage::parse(r#"{"type":"resize"}"#), None);
        assert_eq!(AuthMessage::parse("not json"), None);
    }

    #[test]
    fn closures_and_static_tokens_are_providers() {
        let from_closure: &dyn TokenProvider = &|| Some("t1".to_string());
        assert_eq!(from_closure.token(), Some("t1".to_string()));

        let fixed = StaticToken("t2".to_string());
        assert_eq!(fixed.token(), Some("t2".to_string()));

        let missing: &dyn TokenProvider = &|| None;
        assert_eq!(missing.token(), None);
    }
}
