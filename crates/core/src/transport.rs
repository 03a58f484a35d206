//! The streaming transport seam.
//!
//! A transport owns the socket to the remote voice service and speaks to the
//! session manager exclusively through channels: inbound notifications on
//! one side, outbound commands on the other. The manager never touches wire
//! frames, and the transport never touches session state.

use crate::auth::SignedSessionUrl;
use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tokio::sync::mpsc;

/// Notifications produced by an open streaming session, delivered in the
/// order the transport produced them.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// The remote service confirmed the handshake.
    Opened,
    /// An inbound payload (transcript, agent response, control event),
    /// forwarded verbatim. Opaque to the session core.
    Message(serde_json::Value),
    /// The remote party started (`true`) or stopped (`false`) producing
    /// audio.
    Speaking(bool),
    /// The session ended cleanly, closed by either side. Always the last
    /// event of a clean session.
    Closed,
    /// The transport failed. Always the last event of a failed session.
    Failed(TransportError),
}

/// Commands accepted by an open streaming session.
#[derive(Debug)]
pub enum TransportCommand {
    /// A chunk of captured microphone audio, raw little-endian PCM16 bytes.
    Audio(Bytes),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("failed to open streaming session: {0}")]
    Connect(String),
    #[error("streaming session failed: {0}")]
    Stream(String),
    #[error("handshake was not confirmed in time")]
    HandshakeTimeout,
}

/// The live handle to one streaming session.
///
/// Dropping the handle (in particular `commands`) tells the transport task
/// to tear the connection down at its next suspension point — including
/// right after a still-pending connect resolves. That is how an `end()`
/// issued mid-connect is honored without blocking the caller.
pub struct TransportHandle {
    pub events: mpsc::Receiver<TransportEvent>,
    pub commands: mpsc::Sender<TransportCommand>,
}

/// Opens streaming sessions from signed session URLs.
#[async_trait]
pub trait SessionTransport: Send + Sync {
    async fn open(&self, url: &SignedSessionUrl) -> Result<TransportHandle, TransportError>;
}
