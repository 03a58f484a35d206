//! Wire protocol of the ElevenLabs Conversational AI WebSocket.
//!
//! Server frames are JSON objects tagged by `type`. Only the kinds the
//! transport reacts to are modeled here; anything else is forwarded to the
//! session core verbatim.

use serde::{Deserialize, Serialize};

/// Server-to-client events.
#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// First event of every conversation; concludes the handshake.
    ConversationInitiationMetadata {
        conversation_initiation_metadata_event: ConversationMetadata,
    },
    /// Keep-alive probe; must be answered with a pong carrying the same
    /// `event_id`.
    Ping { ping_event: PingEvent },
    /// A chunk of agent speech, base64 PCM16.
    Audio { audio_event: AudioEvent },
    /// The agent's response text for the current turn.
    AgentResponse { agent_response_event: AgentResponseEvent },
    /// Transcription of the user's speech.
    UserTranscript {
        user_transcription_event: UserTranscriptionEvent,
    },
    /// The user talked over the agent; pending agent audio is void.
    Interruption { interruption_event: InterruptionEvent },
}

#[derive(Deserialize, Debug)]
pub struct ConversationMetadata {
    pub conversation_id: String,
    #[serde(default)]
    pub agent_output_audio_format: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct PingEvent {
    pub event_id: u64,
    #[serde(default)]
    pub ping_ms: Option<u64>,
}

#[derive(Deserialize, Debug)]
pub struct AudioEvent {
    pub audio_base_64: String,
    pub event_id: u64,
}

#[derive(Deserialize, Debug)]
pub struct AgentResponseEvent {
    pub agent_response: String,
}

#[derive(Deserialize, Debug)]
pub struct UserTranscriptionEvent {
    pub user_transcript: String,
}

#[derive(Deserialize, Debug)]
pub struct InterruptionEvent {
    #[serde(default)]
    pub event_id: Option<u64>,
}

/// Client-to-server control events.
#[derive(Serialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    Pong { event_id: u64 },
}

/// Captured microphone audio, base64 PCM16. The one client frame the
/// protocol leaves untagged.
#[derive(Serialize, Debug)]
pub struct UserAudioChunk<'a> {
    pub user_audio_chunk: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_conversation_metadata() {
        let frame = r#"{
            "type": "conversation_initiation_metadata",
            "conversation_initiation_metadata_event": {
                "conversation_id": "conv_123",
                "agent_output_audio_format": "pcm_16000"
            }
        }"#;
        match serde_json::from_str::<ServerEvent>(frame).unwrap() {
            ServerEvent::ConversationInitiationMetadata {
                conversation_initiation_metadata_event: metadata,
            } => {
                assert_eq!(metadata.conversation_id, "conv_123");
                assert_eq!(metadata.agent_output_audio_format.as_deref(), Some("pcm_16000"));
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn parses_ping_and_answers_with_matching_event_id() {
        let frame = r#"{"type": "ping", "ping_event": {"event_id": 42, "ping_ms": 120}}"#;
        let event_id = match serde_json::from_str::<ServerEvent>(frame).unwrap() {
            ServerEvent::Ping { ping_event } => ping_event.event_id,
            other => panic!("wrong variant: {other:?}"),
        };

        let pong = serde_json::to_value(ClientEvent::Pong { event_id }).unwrap();
        assert_eq!(pong, serde_json::json!({"type": "pong", "event_id": 42}));
    }

    #[test]
    fn parses_audio_event() {
        let frame = r#"{"type": "audio", "audio_event": {"audio_base_64": "AAA=", "event_id": 7}}"#;
        match serde_json::from_str::<ServerEvent>(frame).unwrap() {
            ServerEvent::Audio { audio_event } => {
                assert_eq!(audio_event.audio_base_64, "AAA=");
                assert_eq!(audio_event.event_id, 7);
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn parses_transcript_events() {
        let frame = r#"{"type": "user_transcript", "user_transcription_event": {"user_transcript": "hello"}}"#;
        match serde_json::from_str::<ServerEvent>(frame).unwrap() {
            ServerEvent::UserTranscript {
                user_transcription_event: event,
            } => assert_eq!(event.user_transcript, "hello"),
            other => panic!("wrong variant: {other:?}"),
        }

        let frame = r#"{"type": "agent_response", "agent_response_event": {"agent_response": "hi there"}}"#;
        match serde_json::from_str::<ServerEvent>(frame).unwrap() {
            ServerEvent::AgentResponse {
                agent_response_event: event,
            } => assert_eq!(event.agent_response, "hi there"),
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn unknown_event_kinds_do_not_parse() {
        let frame = r#"{"type": "internal_tentative_agent_response", "text": "..."}"#;
        assert!(serde_json::from_str::<ServerEvent>(frame).is_err());
    }

    #[test]
    fn audio_chunk_frame_is_untagged() {
        let frame = serde_json::to_value(UserAudioChunk {
            user_audio_chunk: "UENNMTY=",
        })
        .unwrap();
        assert_eq!(frame, serde_json::json!({"user_audio_chunk": "UENNMTY="}));
    }
}
