//! The authorization exchange seam.
//!
//! Long-lived credentials are never handed to the streaming transport.
//! Instead they are traded for a short-lived, single-use session URL through
//! a [`SessionAuthorizer`], and only that artifact reaches the socket layer.

use crate::credentials::Credentials;
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// A short-lived, single-use WebSocket URL returned by the authorization
/// exchange. It embeds a bearer token, so `Debug` output redacts it.
#[derive(Clone)]
pub struct SignedSessionUrl(String);

impl SignedSessionUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SignedSessionUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SignedSessionUrl([redacted])")
    }
}

/// Failures of the authorization exchange. All carry enough detail for the
/// caller to present, none carry the credentials themselves.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("authorization endpoint returned HTTP {code}: {body}")]
    Status { code: u16, body: String },
    #[error("authorization request failed: {0}")]
    Network(String),
    #[error("authorization response was malformed: {0}")]
    MalformedResponse(String),
    #[error("authorization request timed out")]
    TimedOut,
}

/// Trades credentials for a signed session URL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionAuthorizer: Send + Sync {
    async fn authorize(&self, credentials: &Credentials) -> Result<SignedSessionUrl, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_the_signed_url() {
        let url = SignedSessionUrl::new("wss://host/session?token=super-secret");
        assert!(!format!("{url:?}").contains("super-secret"));
    }
}
