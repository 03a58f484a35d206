//! Microphone access and capture through the host audio API.

use crate::audio;
use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use helpline_core::gate::{MicPermission, MicrophoneAccess};
use tokio::sync::mpsc;
use tracing::{error, trace, warn};

/// Desktop microphone access via cpal.
///
/// Desktop hosts have no separate permission prompt: a usable default input
/// device is the grant signal, and its absence (or a device that refuses to
/// describe a config) is a denial.
pub struct CpalMicrophone;

#[async_trait]
impl MicrophoneAccess for CpalMicrophone {
    async fn request(&self) -> MicPermission {
        let Some(device) = cpal::default_host().default_input_device() else {
            warn!("no default input device");
            return MicPermission::Denied;
        };
        match device.default_input_config() {
            Ok(_) => MicPermission::Granted,
            Err(error) => {
                warn!(%error, "input device rejected config query");
                MicPermission::Denied
            }
        }
    }
}

/// A running capture stream. Capture stops when this is dropped.
pub struct CaptureStream {
    _stream: cpal::Stream,
}

/// Starts capturing mono 16 kHz audio, sending PCM16 frames to `chunks`.
pub fn start_capture(chunks: mpsc::Sender<Bytes>) -> anyhow::Result<CaptureStream> {
    let device = cpal::default_host()
        .default_input_device()
        .context("no default input device")?;
    let config = cpal::StreamConfig {
        channels: 1,
        sample_rate: cpal::SampleRate(audio::CONVAI_PCM16_SAMPLE_RATE),
        buffer_size: cpal::BufferSize::Default,
    };

    let stream = device.build_input_stream(
        &config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            // The callback runs on the audio thread; never block it.
            if chunks.try_send(audio::capture_frame_to_pcm16(data)).is_err() {
                trace!("capture channel full, dropping frame");
            }
        },
        |error| error!(%error, "microphone stream error"),
        None,
    )?;
    stream.play()?;

    Ok(CaptureStream { _stream: stream })
}
