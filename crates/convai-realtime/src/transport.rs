//! Realtime WebSocket transport for ElevenLabs conversations.
//!
//! One spawned task owns the socket for the session's lifetime: it answers
//! protocol pings, relays captured audio upstream, and translates server
//! frames into the core's transport events. The task shuts down when the
//! session manager drops its command channel, when either side closes the
//! socket, or on a transport failure.

use crate::protocol::{ClientEvent, ServerEvent, UserAudioChunk};
use async_trait::async_trait;
use base64::Engine;
use futures_util::{Sink, SinkExt, StreamExt};
use helpline_core::auth::SignedSessionUrl;
use helpline_core::transport::{
    SessionTransport, TransportCommand, TransportError, TransportEvent, TransportHandle,
};
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message as WsMessage};
use tracing::{debug, info, warn};

/// Default bound on waiting for `conversation_initiation_metadata`.
const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(15);

const CHANNEL_CAPACITY: usize = 128;

/// Opens realtime conversations from signed session URLs.
pub struct ConvaiTransport {
    handshake_timeout: Duration,
}

impl ConvaiTransport {
    pub fn new() -> Self {
        Self {
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }

    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }
}

impl Default for ConvaiTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionTransport for ConvaiTransport {
    async fn open(&self, url: &SignedSessionUrl) -> Result<TransportHandle, TransportError> {
        let (event_tx, events) = mpsc::channel(CHANNEL_CAPACITY);
        let (commands, command_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let url = url.clone();
        let handshake_timeout = self.handshake_timeout;
        tokio::spawn(async move {
            if let Err(error) = run_conversation(url, handshake_timeout, &event_tx, command_rx).await
            {
                let _ = event_tx.send(TransportEvent::Failed(error)).await;
            }
        });
        Ok(TransportHandle { events, commands })
    }
}

async fn run_conversation(
    url: SignedSessionUrl,
    handshake_timeout: Duration,
    events: &mpsc::Sender<TransportEvent>,
    mut commands: mpsc::Receiver<TransportCommand>,
) -> Result<(), TransportError> {
    let (ws_stream, _) = connect_async(url.as_str())
        .await
        .map_err(|error| TransportError::Connect(error.to_string()))?;
    debug!("websocket open, awaiting conversation metadata");
    let (mut ws_tx, mut ws_rx) = ws_stream.split();

    let mut connected = false;
    let mut speaking = false;
    let deadline = tokio::time::sleep(handshake_timeout);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline, if !connected => {
                return Err(TransportError::HandshakeTimeout);
            }
            command = commands.recv() => {
                match command {
                    Some(TransportCommand::Audio(chunk)) => {
                        let encoded = base64::engine::general_purpose::STANDARD.encode(&chunk);
                        let frame = serde_json::to_string(&UserAudioChunk {
                            user_audio_chunk: &encoded,
                        })
                        .map_err(|error| TransportError::Stream(error.to_string()))?;
                        ws_tx
                            .send(WsMessage::Text(frame))
                            .await
                            .map_err(|error| TransportError::Stream(error.to_string()))?;
                    }
                    // The manager dropped its handle: close the socket.
                    None => {
                        let _ = ws_tx.send(WsMessage::Close(None)).await;
                        info!("conversation closed by local end");
                        let _ = events.send(TransportEvent::Closed).await;
                        return Ok(());
                    }
                }
            }
            frame = ws_rx.next() => {
                match frame {
                    Some(Ok(WsMessage::Text(text))) => {
                        handle_server_frame(&text, &mut ws_tx, events, &mut connected, &mut speaking)
                            .await?;
                    }
                    Some(Ok(WsMessage::Close(close_frame))) => {
                        info!(?close_frame, "conversation closed by remote end");
                        let _ = events.send(TransportEvent::Closed).await;
                        return Ok(());
                    }
                    // Socket-level pings are answered by tungstenite itself.
                    Some(Ok(_)) => {}
                    Some(Err(error)) => {
                        return Err(TransportError::Stream(error.to_string()));
                    }
                    None => {
                        return Err(TransportError::Stream(
                            "stream ended without close frame".into(),
                        ));
                    }
                }
            }
        }
    }
}

/// Translates one server frame into transport events, answering pings and
/// tracking whether the agent is currently speaking.
///
/// Frames the protocol module does not model are forwarded verbatim; the
/// session core treats payloads as opaque anyway.
async fn handle_server_frame<S>(
    text: &str,
    ws_tx: &mut S,
    events: &mpsc::Sender<TransportEvent>,
    connected: &mut bool,
    speaking: &mut bool,
) -> Result<(), TransportError>
where
    S: Sink<WsMessage> + Unpin,
    S::Error: fmt::Display,
{
    let payload: serde_json::Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(error) => {
            warn!(%error, "discarding unparseable frame");
            return Ok(());
        }
    };

    match serde_json::from_value::<ServerEvent>(payload.clone()) {
        Ok(ServerEvent::ConversationInitiationMetadata {
            conversation_initiation_metadata_event: metadata,
        }) => {
            if !*connected {
                *connected = true;
                info!(conversation_id = %metadata.conversation_id, "conversation established");
                let _ = events.send(TransportEvent::Opened).await;
            }
        }
        Ok(ServerEvent::Ping { ping_event }) => {
            let pong = serde_json::to_string(&ClientEvent::Pong {
                event_id: ping_event.event_id,
            })
            .map_err(|error| TransportError::Stream(error.to_string()))?;
            ws_tx
                .send(WsMessage::Text(pong))
                .await
                .map_err(|error| TransportError::Stream(error.to_string()))?;
        }
        Ok(ServerEvent::Audio { .. }) => {
            if !*speaking {
                *speaking = true;
                let _ = events.send(TransportEvent::Speaking(true)).await;
            }
            let _ = events.send(TransportEvent::Message(payload)).await;
        }
        // The protocol has no explicit "agent finished speaking" event; the
        // agent yielding the floor (user speech, interruption) is the signal.
        Ok(ServerEvent::UserTranscript { .. }) | Ok(ServerEvent::Interruption { .. }) => {
            if *speaking {
                *speaking = false;
                let _ = events.send(TransportEvent::Speaking(false)).await;
            }
            let _ = events.send(TransportEvent::Message(payload)).await;
        }
        Ok(ServerEvent::AgentResponse { .. }) => {
            let _ = events.send(TransportEvent::Message(payload)).await;
        }
        Err(_) => {
            let _ = events.send(TransportEvent::Message(payload)).await;
        }
    }
    Ok(())
}
