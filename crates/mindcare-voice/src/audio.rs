//! Microphone capture using CPAL
//!
//! The capture facility delivers audio push-style as [`Fragment`]s over an
//! unbounded channel, in arrival order. The device handle is the only
//! exclusive resource in the pipeline: whoever holds the returned
//! [`CaptureStream`] owns the device, and dropping it is the one and only
//! release path.

use crate::error::{SessionError, VoiceResult};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::StreamConfig;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Audio configuration
#[derive(Debug, Clone)]
pub struct AudioConfig {
    /// Sample rate in Hz (default: 16000, what the inference backend expects)
    pub sample_rate: u32,

    /// Number of channels (default: 1 for mono)
    pub channels: u16,

    /// Samples accumulated per fragment (default: 480 for 30ms at 16kHz)
    pub chunk_size: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            channels: 1,
            chunk_size: 480, // 30ms at 16kHz
        }
    }
}

/// One incremental chunk of captured audio, exactly as delivered by the
/// capture facility. The assembled payload is the concatenation of all
/// fragments in arrival order, nothing added and nothing dropped.
#[derive(Debug, Clone)]
pub struct Fragment {
    /// Raw bytes in the capture encoding (WAV header first, then i16 LE PCM
    /// for the microphone backend).
    pub bytes: Vec<u8>,
}

/// Exclusive handle to a live input stream.
///
/// Dropping the handle stops capture and releases the device, so release is
/// guaranteed on every exit path, including abandonment.
pub trait CaptureStream {}

/// Seam between the session controller and the platform capture facility.
///
/// The production implementation is [`MicBackend`]; tests script their own.
pub trait CaptureBackend {
    /// Acquire the input device and start delivering fragments on `tx`.
    ///
    /// Fails with [`SessionError::DeviceUnavailable`] when permission is
    /// denied or no input device exists.
    fn open(
        &mut self,
        config: &AudioConfig,
        tx: mpsc::UnboundedSender<Fragment>,
    ) -> VoiceResult<Box<dyn CaptureStream>>;
}

/// Build a WAV header for a capture whose final length is unknown.
///
/// Both RIFF and data chunk lengths are left at `u32::MAX`; decoders
/// (including the backend's ffmpeg step) treat the data chunk as running to
/// end of file. This lets the header be the first fragment of a stream that
/// is assembled by pure concatenation.
pub fn streaming_wav_header(sample_rate: u32, channels: u16) -> Vec<u8> {
    let byte_rate = sample_rate * channels as u32 * 2;
    let block_align = channels * 2;

    let mut buf = Vec::with_capacity(44);
    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&u32::MAX.to_le_bytes());
    buf.extend_from_slice(b"WAVE");
    // fmt subchunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
    buf.extend_from_slice(&channels.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
    // data subchunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&u32::MAX.to_le_bytes());
    buf
}

/// Microphone capture backend (CPAL default input device)
pub struct MicBackend;

struct MicStream {
    _stream: cpal::Stream,
}

impl CaptureStream for MicStream {}

impl CaptureBackend for MicBackend {
    fn open(
        &mut self,
        config: &AudioConfig,
        tx: mpsc::UnboundedSender<Fragment>,
    ) -> VoiceResult<Box<dyn CaptureStream>> {
        let device = cpal::default_host().default_input_device().ok_or_else(|| {
            SessionError::DeviceUnavailable("no input device available".to_string())
        })?;

        info!(
            "🎤 Using input device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let default_config = device.default_input_config()?;
        info!("🔧 Default input config: {:?}", default_config);

        let stream_config = StreamConfig {
            channels: config.channels,
            sample_rate: cpal::SampleRate(config.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        // First fragment is the container header; everything after is PCM.
        if tx
            .send(Fragment {
                bytes: streaming_wav_header(config.sample_rate, config.channels),
            })
            .is_err()
        {
            return Err(SessionError::AudioStream(
                "fragment channel closed before capture started".to_string(),
            ));
        }

        let fragment_bytes = config.chunk_size * 2; // 16-bit samples
        let mut pending: Vec<u8> = Vec::with_capacity(fragment_bytes);

        let stream = device.build_input_stream(
            &stream_config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                for &sample in data {
                    let clamped = sample.clamp(-1.0, 1.0);
                    let s = (clamped * 32767.0).round() as i16;
                    pending.extend_from_slice(&s.to_le_bytes());

                    if pending.len() >= fragment_bytes {
                        let fragment = Fragment {
                            bytes: std::mem::replace(
                                &mut pending,
                                Vec::with_capacity(fragment_bytes),
                            ),
                        };
                        if tx.send(fragment).is_err() {
                            // Receiver gone; the stream is about to be dropped.
                            return;
                        }
                    }
                }
            },
            move |err| {
                warn!("Audio stream error: {}", err);
            },
            None, // No timeout
        )?;

        stream.play()?;

        info!("✅ Audio capture started");

        Ok(Box::new(MicStream { _stream: stream }))
    }
}

impl MicBackend {
    /// List available input devices
    pub fn list_input_devices() -> VoiceResult<Vec<String>> {
        let host = cpal::default_host();
        let devices = host.input_devices()?;

        let mut device_names = Vec::new();
        for device in devices {
            if let Ok(name) = device.name() {
                device_names.push(name);
            }
        }

        Ok(device_names)
    }
}
