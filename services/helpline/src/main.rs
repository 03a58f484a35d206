//! Main entrypoint for the Helpline voice demo.
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment and CLI flags.
//! 2. Initializing logging.
//! 3. Running the credential gate (structural checks + microphone access).
//! 4. Starting the conversation session and driving its event loop until
//!    the remote side hangs up or the user presses Ctrl+C.

mod audio;
mod config;
mod mic;
mod playback;

use anyhow::Context;
use clap::Parser;
use config::Config;
use convai_realtime::{auth::ConvaiAuthorizer, transport::ConvaiTransport};
use helpline_core::gate::CredentialGate;
use helpline_core::session::{SessionEvent, SessionManager};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

#[derive(Parser, Debug)]
#[command(name = "helpline", version, about = "Voice AI customer service demo")]
struct Args {
    /// Agent to converse with; overrides ELEVENLABS_AGENT_ID.
    #[arg(long)]
    agent_id: Option<String>,
}

/// Listens for the `Ctrl+C` signal to hang up gracefully.
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Received shutdown signal. Ending conversation...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let args = Args::parse();
    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(agent_id) = args.agent_id {
        config.agent_id = agent_id;
    }

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();

    // --- 3. Credential Gate ---
    let credentials = config.credentials();
    let gate = CredentialGate::new(Arc::new(mic::CpalMicrophone));
    let ready = gate
        .validate(&credentials)
        .await
        .context("Setup failed")?;
    info!("Setup complete. Ready to start voice conversation.");

    // --- 4. Audio I/O ---
    let (chunk_tx, mut chunk_rx) = mpsc::channel(64);
    let _capture = mic::start_capture(chunk_tx).context("Failed to open microphone stream")?;
    let mut playback = playback::start_playback().context("Failed to open audio output")?;

    // --- 5. Start the Session ---
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let mut manager = SessionManager::new(
        Arc::new(ConvaiAuthorizer::new()),
        Arc::new(ConvaiTransport::new()),
        event_tx,
    );
    manager
        .start(&credentials, ready)
        .await
        .context("Failed to start conversation")?;
    info!(
        agent_id = %config.agent_id,
        "Conversation starting. Speak naturally; press Ctrl+C to hang up."
    );

    // --- 6. Event Loop ---
    loop {
        tokio::select! {
            _ = shutdown_signal() => {
                manager.end().await?;
                break;
            }
            alive = manager.pump() => {
                if !alive {
                    break;
                }
            }
            Some(chunk) = chunk_rx.recv() => {
                manager.send_audio(chunk);
            }
            Some(event) = event_rx.recv() => {
                render_event(event, &mut playback);
            }
        }
    }

    // Drain whatever the session emitted on the way down.
    while let Ok(event) = event_rx.try_recv() {
        render_event(event, &mut playback);
    }
    info!("Conversation ended.");
    Ok(())
}

/// Renders one session notification: status lines for transitions,
/// transcript lines for text, and agent audio into the playback buffer.
fn render_event(event: SessionEvent, playback: &mut playback::Playback) {
    match event {
        SessionEvent::Connected => info!("Connected. The agent is listening."),
        SessionEvent::Disconnected => info!("Disconnected."),
        SessionEvent::Error(error) => error!(%error, "Session error"),
        SessionEvent::Message(payload) => match payload.get("type").and_then(|t| t.as_str()) {
            Some("audio") => {
                if let Some(encoded) = payload
                    .pointer("/audio_event/audio_base_64")
                    .and_then(|v| v.as_str())
                {
                    playback.enqueue(&audio::agent_audio_to_samples(encoded));
                }
            }
            Some("agent_response") => {
                if let Some(text) = payload
                    .pointer("/agent_response_event/agent_response")
                    .and_then(|v| v.as_str())
                {
                    println!("agent: {text}");
                }
            }
            Some("user_transcript") => {
                if let Some(text) = payload
                    .pointer("/user_transcription_event/user_transcript")
                    .and_then(|v| v.as_str())
                {
                    println!("you: {text}");
                }
            }
            _ => debug!(?payload, "unhandled conversation event"),
        },
    }
}
