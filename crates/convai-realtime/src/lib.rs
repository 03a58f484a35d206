//! ElevenLabs Conversational AI client.
//!
//! Implements the two remote-facing seams of `helpline-core`: the signed-URL
//! authorization exchange over HTTPS (`auth`) and the realtime WebSocket
//! transport (`transport`), with the wire protocol types in `protocol`.

pub mod auth;
pub mod protocol;
pub mod transport;
