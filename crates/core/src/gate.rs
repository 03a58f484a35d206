//! The credential gate: everything that must hold before a session may start.

use crate::credentials::Credentials;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Outcome of a platform microphone permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MicPermission {
    /// No request has completed, or the prompt was dismissed without an
    /// answer.
    Unknown,
    Granted,
    Denied,
}

/// Platform hook for requesting microphone access.
///
/// The request is owned by the host runtime and may suspend (native prompt,
/// device probe). The gate asks again on every validation pass, so
/// implementations must not cache a denial across setup attempts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MicrophoneAccess: Send + Sync {
    async fn request(&self) -> MicPermission;
}

/// Why a setup attempt was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("API key is missing")]
    MissingApiKey,
    #[error("agent ID is missing")]
    MissingAgentId,
    #[error("microphone access was denied")]
    PermissionDenied,
}

/// Proof of a successful validation pass.
///
/// Consumed by [`SessionManager::start`](crate::session::SessionManager::start);
/// once the resulting session ends, a fresh token (and therefore a fresh
/// permission check) is required before the next one.
#[derive(Debug)]
pub struct Ready {
    _single_use: (),
}

/// Validates credentials and microphone access ahead of a session start.
pub struct CredentialGate {
    microphone: Arc<dyn MicrophoneAccess>,
}

impl CredentialGate {
    pub fn new(microphone: Arc<dyn MicrophoneAccess>) -> Self {
        Self { microphone }
    }

    /// Checks both credential fields, then requests microphone access.
    ///
    /// Structural failures are reported before the permission request, so an
    /// empty field never triggers a prompt. A dismissed prompt counts as a
    /// denial for this attempt.
    pub async fn validate(&self, credentials: &Credentials) -> Result<Ready, ValidationError> {
        if credentials.api_key().trim().is_empty() {
            return Err(ValidationError::MissingApiKey);
        }
        if credentials.agent_id().trim().is_empty() {
            return Err(ValidationError::MissingAgentId);
        }
        match self.microphone.request().await {
            MicPermission::Granted => Ok(Ready { _single_use: () }),
            MicPermission::Denied | MicPermission::Unknown => {
                Err(ValidationError::PermissionDenied)
            }
        }
    }
}
