//! The screening session state machine
//!
//! One authoritative tagged state drives the whole capture/upload flow:
//!
//! ```text
//! Idle --start()--> Recording --stop()--> Uploading --success--> Completed
//!                        |                     |
//!                   (abandon/cancel:           +--failure--> Failed
//!                    device released)
//! ```
//!
//! `Failed` and `Completed` are terminal for the session; a new `start()`
//! always begins a fresh session, never resumes. The device handle lives
//! inside the `Recording` variant, so it is released on every exit path —
//! `stop()`, `cancel()`, or simply dropping the controller.

use crate::audio::{AudioConfig, CaptureBackend, CaptureStream, Fragment};
use crate::error::{SessionError, VoiceResult};
use crate::upload::{EmotionReport, UploadClient};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Observable session status for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Idle,
    Recording,
    Uploading,
    Failed,
    Completed,
}

/// Internal tagged state. The stream handle and fragment receiver exist
/// exactly while recording; a terminal failure retains the classified error.
enum SessionState {
    Idle,
    Recording {
        stream: Box<dyn CaptureStream>,
        rx: mpsc::UnboundedReceiver<Fragment>,
    },
    Uploading,
    Failed { error: SessionError },
    Completed,
}

/// Drives one screening session at a time: acquire the microphone, buffer
/// fragments, assemble the payload on stop, and hand it to the upload
/// client. At most one session is ever active.
pub struct ScreeningController<B: CaptureBackend> {
    backend: B,
    uploader: UploadClient,
    audio: AudioConfig,
    state: SessionState,
}

impl<B: CaptureBackend> ScreeningController<B> {
    pub fn new(backend: B, uploader: UploadClient, audio: AudioConfig) -> Self {
        Self {
            backend,
            uploader,
            audio,
            state: SessionState::Idle,
        }
    }

    /// Current observable status.
    pub fn status(&self) -> SessionStatus {
        match &self.state {
            SessionState::Idle => SessionStatus::Idle,
            SessionState::Recording { .. } => SessionStatus::Recording,
            SessionState::Uploading => SessionStatus::Uploading,
            SessionState::Failed { .. } => SessionStatus::Failed,
            SessionState::Completed => SessionStatus::Completed,
        }
    }

    /// The classified error of a failed session, if the session failed.
    pub fn last_error(&self) -> Option<&SessionError> {
        match &self.state {
            SessionState::Failed { error } => Some(error),
            _ => None,
        }
    }

    /// Begin a fresh session: acquire the microphone and start buffering
    /// fragments.
    ///
    /// Rejected while a session is recording or uploading. On device denial
    /// the state stays `Idle` and the error is returned; there is no
    /// automatic retry — acquiring the device may prompt the user.
    pub fn start(&mut self) -> VoiceResult<()> {
        match self.state {
            SessionState::Recording { .. } => {
                return Err(SessionError::SessionActive("recording"));
            }
            SessionState::Uploading => {
                return Err(SessionError::SessionActive("uploading"));
            }
            _ => {}
        }

        // A new start always begins a fresh session; discard any terminal one.
        self.state = SessionState::Idle;

        let (tx, rx) = mpsc::unbounded_channel();
        let stream = self.backend.open(&self.audio, tx)?;
        self.state = SessionState::Recording { stream, rx };

        info!("▶️ Recording started");
        Ok(())
    }

    /// Finalize the recording and upload it.
    ///
    /// The device handle is released first and unconditionally, before the
    /// payload is assembled or touches the network. Buffered fragments are
    /// drained in arrival order and concatenated into the payload; an empty
    /// recording is still uploaded. Exactly one upload attempt is made: on
    /// success the session terminates `Completed` and the report is handed
    /// to the caller by value, on failure it terminates `Failed` with the
    /// classified error retained.
    pub async fn stop(&mut self) -> VoiceResult<EmotionReport> {
        let (stream, mut rx) =
            match std::mem::replace(&mut self.state, SessionState::Uploading) {
                SessionState::Recording { stream, rx } => (stream, rx),
                other => {
                    self.state = other;
                    return Err(SessionError::NotRecording);
                }
            };

        // Release the microphone before anything else can fail.
        drop(stream);

        let mut payload = Vec::new();
        let mut fragments = 0usize;
        while let Ok(fragment) = rx.try_recv() {
            payload.extend_from_slice(&fragment.bytes);
            fragments += 1;
        }

        info!(
            fragments,
            bytes = payload.len(),
            "⏹️ Recording stopped, uploading"
        );

        match self.uploader.predict(payload).await {
            Ok(report) => {
                self.state = SessionState::Completed;
                info!("✅ Screening completed");
                Ok(report)
            }
            Err(error) => {
                warn!("Upload failed: {}", error);
                self.state = SessionState::Failed {
                    error: error.clone(),
                };
                Err(error)
            }
        }
    }

    /// Discard an in-flight recording without uploading.
    ///
    /// Releases the device and drops all buffered fragments; the controller
    /// returns to `Idle`. Harmless in any other state.
    pub fn cancel(&mut self) {
        if matches!(self.state, SessionState::Recording { .. }) {
            info!("🚫 Recording cancelled, capture discarded");
        }
        self.state = SessionState::Idle;
    }
}
