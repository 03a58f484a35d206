//! Core session lifecycle for the Helpline voice demo.
//!
//! This crate owns the two components with real behavior: the credential
//! gate (validates the caller's secrets and microphone access before a
//! session may start) and the session manager (drives the connect/disconnect
//! protocol against the remote voice service and tracks its state). The
//! remote service and the host platform are reached only through the traits
//! in `auth`, `transport`, and `gate`, so the whole lifecycle is testable
//! without a network or a microphone.

pub mod auth;
pub mod credentials;
pub mod gate;
pub mod session;
pub mod transport;
