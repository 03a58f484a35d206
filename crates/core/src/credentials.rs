//! Caller-supplied secrets for the voice service.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// The two secrets required to open a conversation session.
///
/// The API key authenticates the authorization exchange; the agent
/// identifier selects which hosted agent answers the call. Both are owned by
/// the caller and live only in process memory. The key is held in a
/// zeroizing wrapper and never appears in `Debug` output or logs.
#[derive(Clone)]
pub struct Credentials {
    api_key: SecretString,
    agent_id: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, agent_id: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            agent_id: agent_id.into(),
        }
    }

    /// The raw API key. Callers must keep it out of logs and error messages.
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"[redacted]")
            .field("agent_id", &self.agent_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_the_api_key() {
        let credentials = Credentials::new("xi-very-secret", "agent-123");
        let rendered = format!("{credentials:?}");
        assert!(!rendered.contains("xi-very-secret"));
        assert!(rendered.contains("agent-123"));
    }

    #[test]
    fn accessors_return_the_original_values() {
        let credentials = Credentials::new("key", "agent");
        assert_eq!(credentials.api_key(), "key");
        assert_eq!(credentials.agent_id(), "agent");
    }
}
