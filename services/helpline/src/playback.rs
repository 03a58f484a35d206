//! Agent audio playback through the default output device.

use crate::audio;
use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapProd, HeapRb};
use tracing::{error, trace};

/// Seconds of agent audio the buffer can hold ahead of the device.
const BUFFER_SECONDS: usize = 4;

/// A running playback stream, fed through [`Playback::enqueue`].
pub struct Playback {
    producer: HeapProd<f32>,
    _stream: cpal::Stream,
}

/// Opens the default output device at the conversation sample rate.
pub fn start_playback() -> anyhow::Result<Playback> {
    let device = cpal::default_host()
        .default_output_device()
        .context("no default output device")?;
    let config = cpal::StreamConfig {
        channels: 1,
        sample_rate: cpal::SampleRate(audio::CONVAI_PCM16_SAMPLE_RATE),
        buffer_size: cpal::BufferSize::Default,
    };

    let buffer = HeapRb::<f32>::new(audio::CONVAI_PCM16_SAMPLE_RATE as usize * BUFFER_SECONDS);
    let (producer, mut consumer) = buffer.split();

    let stream = device.build_output_stream(
        &config,
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            let filled = consumer.pop_slice(data);
            // Silence while the agent is quiet.
            data[filled..].fill(0.0);
        },
        |error| error!(%error, "playback stream error"),
        None,
    )?;
    stream.play()?;

    Ok(Playback {
        producer,
        _stream: stream,
    })
}

impl Playback {
    /// Queues decoded agent samples, dropping the tail if the buffer is full
    /// (the device catches up on the next response).
    pub fn enqueue(&mut self, samples: &[f32]) {
        let pushed = self.producer.push_slice(samples);
        if pushed < samples.len() {
            trace!(dropped = samples.len() - pushed, "playback buffer full");
        }
    }
}
