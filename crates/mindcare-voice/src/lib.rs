//! # MindCare Voice — capture-and-screen pipeline
//!
//! This crate implements the client-side voice screening pipeline for the
//! MindCare wellness app: capture microphone audio for a bounded session,
//! assemble the recording, upload it to the emotion inference backend, and
//! hand the parsed report to the presentation layer.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                   ScreeningController                        │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐     │
//! │  │  Microphone  │ → │   Fragment   │ → │   Payload    │     │
//! │  │    (cpal)    │   │   buffer     │   │  (stop/WAV)  │     │
//! │  └──────────────┘   └──────────────┘   └──────┬───────┘     │
//! │                                               ↓              │
//! │                                       ┌──────────────┐      │
//! │                                       │ UploadClient │      │
//! │                                       │  (reqwest)   │      │
//! │                                       └──────┬───────┘      │
//! └───────────────────────────────────────────── │ ─────────────┘
//!                                                ↓
//!                                         EmotionReport
//! ```
//!
//! The controller is single-session by construction: the exclusive device
//! handle lives inside the `Recording` state, so no two sessions can
//! overlap and abandonment releases the microphone automatically.

pub mod audio;
pub mod error;
pub mod session;
pub mod upload;

pub use audio::{
    streaming_wav_header, AudioConfig, CaptureBackend, CaptureStream, Fragment, MicBackend,
};
pub use error::{SessionError, VoiceResult};
pub use session::{ScreeningController, SessionStatus};
pub use upload::{EmotionReport, EmotionScore, HealthStatus, UploadClient, DEFAULT_BACKEND_URL};
