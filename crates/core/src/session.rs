//! The session manager: owns the conversation session and its lifecycle.

use crate::auth::{AuthError, SessionAuthorizer};
use crate::credentials::Credentials;
use crate::gate::Ready;
use crate::transport::{
    SessionTransport, TransportCommand, TransportEvent, TransportHandle,
};
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Connection lifecycle of the conversation session. `Disconnected` is the
/// initial state and the one every termination path returns to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Failures of the session lifecycle. All are recoverable by a fresh,
/// explicit retry from the caller; the manager never retries on its own.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("a session is already connecting or connected")]
    AlreadyActive,
    #[error("authorization failed: {0}")]
    AuthorizationFailed(#[from] AuthError),
    #[error("session ended unexpectedly: {0}")]
    UnexpectedDisconnect(String),
}

/// Notifications delivered to the UI collaborator, in transition order.
///
/// Per session: `Connected` precedes every message, `Disconnected` is final,
/// and an `Error` for an unexpected drop immediately precedes that final
/// `Disconnected`.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Connected,
    Disconnected,
    Message(serde_json::Value),
    Error(SessionError),
}

/// Default bound on the authorization exchange.
pub const DEFAULT_AUTHORIZATION_TIMEOUT: Duration = Duration::from_secs(10);

struct ActiveSession {
    events: mpsc::Receiver<TransportEvent>,
    commands: mpsc::Sender<TransportCommand>,
}

/// Drives the connect/disconnect protocol and tracks session state.
///
/// All mutation goes through `&mut self` methods, so a single owner (the
/// demo's event loop, a test) serializes transitions by construction. The
/// transport runs concurrently but only ever communicates through the
/// channels of its [`TransportHandle`].
pub struct SessionManager {
    authorizer: Arc<dyn SessionAuthorizer>,
    transport: Arc<dyn SessionTransport>,
    notifications: mpsc::UnboundedSender<SessionEvent>,
    authorization_timeout: Duration,
    state: ConnectionState,
    is_speaking: bool,
    active: Option<ActiveSession>,
}

impl SessionManager {
    pub fn new(
        authorizer: Arc<dyn SessionAuthorizer>,
        transport: Arc<dyn SessionTransport>,
        notifications: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            authorizer,
            transport,
            notifications,
            authorization_timeout: DEFAULT_AUTHORIZATION_TIMEOUT,
            state: ConnectionState::default(),
            is_speaking: false,
            active: None,
        }
    }

    pub fn with_authorization_timeout(mut self, timeout: Duration) -> Self {
        self.authorization_timeout = timeout;
        self
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.state
    }

    /// True only while the remote agent is producing audio, which implies
    /// the session is connected.
    pub fn is_speaking(&self) -> bool {
        self.is_speaking
    }

    /// Performs the authorization exchange and opens the streaming session.
    ///
    /// On success the manager is `Connecting`; the `Connected` transition
    /// arrives through [`pump`](Self::pump) once the transport confirms the
    /// handshake. On any failure the manager remains `Disconnected` with no
    /// transport handle allocated, and the error is both returned and
    /// forwarded as a [`SessionEvent::Error`].
    pub async fn start(
        &mut self,
        credentials: &Credentials,
        _ready: Ready,
    ) -> Result<(), SessionError> {
        if self.state != ConnectionState::Disconnected {
            return Err(self.report(SessionError::AlreadyActive));
        }

        let authorize = self.authorizer.authorize(credentials);
        let signed_url = match tokio::time::timeout(self.authorization_timeout, authorize).await {
            Ok(Ok(url)) => url,
            Ok(Err(cause)) => return Err(self.report(SessionError::AuthorizationFailed(cause))),
            Err(_) => {
                return Err(self.report(SessionError::AuthorizationFailed(AuthError::TimedOut)));
            }
        };
        info!(
            agent_id = credentials.agent_id(),
            "authorization exchange succeeded, opening streaming session"
        );

        self.state = ConnectionState::Connecting;
        match self.transport.open(&signed_url).await {
            Ok(TransportHandle { events, commands }) => {
                self.active = Some(ActiveSession { events, commands });
                Ok(())
            }
            Err(cause) => {
                self.state = ConnectionState::Disconnected;
                Err(self.report(SessionError::UnexpectedDisconnect(cause.to_string())))
            }
        }
    }

    /// Ends the session and releases the transport handle.
    ///
    /// Always succeeds: ending while already `Disconnected` is a no-op, and
    /// ending while `Connecting` is honored by deferred teardown (the
    /// transport task observes its dropped command channel as soon as the
    /// connect attempt resolves). Never blocks on the transport.
    pub async fn end(&mut self) -> Result<(), SessionError> {
        if self.active.is_none() && self.state == ConnectionState::Disconnected {
            return Ok(());
        }
        debug!("ending session");
        self.finish(None);
        Ok(())
    }

    /// Receives and applies the next transport notification.
    ///
    /// Returns `false` once no session is active — after a clean close, a
    /// failure, or when called with nothing started — so a drive loop can
    /// use the return value as its continue condition.
    pub async fn pump(&mut self) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        match active.events.recv().await {
            Some(event) => {
                self.apply(event);
                self.active.is_some()
            }
            // The transport task dropped its sender without a terminal
            // event; treat it like any other unexpected drop.
            None => {
                self.finish(Some(SessionError::UnexpectedDisconnect(
                    "transport task stopped".into(),
                )));
                false
            }
        }
    }

    /// Forwards one captured audio chunk to the live session.
    ///
    /// Chunks arriving while no session is connected are dropped with a
    /// warning; audio capture callbacks need a send that is always safe to
    /// call.
    pub fn send_audio(&self, chunk: Bytes) {
        if self.state != ConnectionState::Connected {
            warn!("dropping audio chunk: no connected session");
            return;
        }
        let Some(active) = self.active.as_ref() else {
            return;
        };
        if let Err(error) = active.commands.try_send(TransportCommand::Audio(chunk)) {
            warn!(%error, "dropping audio chunk");
        }
    }

    fn apply(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Opened => {
                if self.state == ConnectionState::Connecting {
                    self.state = ConnectionState::Connected;
                    info!("session connected");
                    self.notify(SessionEvent::Connected);
                }
            }
            TransportEvent::Message(payload) => {
                self.notify(SessionEvent::Message(payload));
            }
            TransportEvent::Speaking(speaking) => {
                // The transport guarantees Opened precedes speaking updates;
                // the flag is meaningless in any other state.
                if self.state == ConnectionState::Connected {
                    self.is_speaking = speaking;
                }
            }
            TransportEvent::Closed => self.finish(None),
            TransportEvent::Failed(cause) => {
                self.finish(Some(SessionError::UnexpectedDisconnect(cause.to_string())));
            }
        }
    }

    /// Tears down the active session. Leaving `Connected` clears
    /// `is_speaking` in the same update, and `Disconnected` is the last
    /// notification the session produces.
    fn finish(&mut self, error: Option<SessionError>) {
        // Dropping the handle closes the command channel; the transport
        // task unwinds at its next suspension point.
        self.active = None;
        self.is_speaking = false;
        self.state = ConnectionState::Disconnected;
        if let Some(error) = error {
            warn!(%error, "session ended unexpectedly");
            self.notify(SessionEvent::Error(error));
        }
        self.notify(SessionEvent::Disconnected);
    }

    fn report(&self, error: SessionError) -> SessionError {
        self.notify(SessionEvent::Error(error.clone()));
        error
    }

    fn notify(&self, event: SessionEvent) {
        // The receiver's lifetime is the collaborator's concern; a dropped
        // UI must not take the session down with it.
        let _ = self.notifications.send(event);
    }
}
