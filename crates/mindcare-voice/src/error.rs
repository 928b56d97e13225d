//! Error types for the voice screening pipeline

use thiserror::Error;

/// Result type alias for screening operations
pub type VoiceResult<T> = Result<T, SessionError>;

/// Errors that can occur during a capture/upload session.
///
/// Variants carry plain strings so a terminal session can retain a clone of
/// the error while the original is returned to the caller.
#[derive(Error, Debug, Clone)]
pub enum SessionError {
    /// Microphone permission denied or no input device present. Fatal for
    /// the attempt; never retried automatically.
    #[error("Audio device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Audio stream error: {0}")]
    AudioStream(String),

    /// A second `start()` while a session is recording or uploading.
    #[error("Session already active ({0})")]
    SessionActive(&'static str),

    #[error("No active recording to stop")]
    NotRecording,

    /// No response reached the server at all.
    #[error("Network error: {0}")]
    Transport(String),

    /// Server reachable but returned a non-success status.
    #[error("Server rejected the recording (HTTP {status}): {body}")]
    RemoteRejected { status: u16, body: String },

    /// Success status but the body was not the expected JSON.
    #[error("Unreadable server response: {0}")]
    MalformedResponse(String),
}

impl SessionError {
    /// Short message suitable for direct display to the user.
    ///
    /// `RemoteRejected` and `MalformedResponse` read the same on purpose:
    /// from the user's side both mean "the server couldn't analyse this".
    pub fn user_message(&self) -> &'static str {
        match self {
            SessionError::DeviceUnavailable(_) => {
                "Microphone unavailable. Check your input device and permissions."
            }
            SessionError::AudioStream(_) => {
                "The microphone stream stopped unexpectedly. Please try again."
            }
            SessionError::SessionActive(_) => "A screening is already in progress.",
            SessionError::NotRecording => "No recording in progress.",
            SessionError::Transport(_) => {
                "Could not reach the analysis server. Check your connection and try again."
            }
            SessionError::RemoteRejected { .. } | SessionError::MalformedResponse(_) => {
                "The server could not analyse your recording. Please try again."
            }
        }
    }
}

impl From<cpal::DevicesError> for SessionError {
    fn from(err: cpal::DevicesError) -> Self {
        SessionError::DeviceUnavailable(err.to_string())
    }
}

impl From<cpal::DefaultStreamConfigError> for SessionError {
    fn from(err: cpal::DefaultStreamConfigError) -> Self {
        SessionError::DeviceUnavailable(err.to_string())
    }
}

impl From<cpal::BuildStreamError> for SessionError {
    fn from(err: cpal::BuildStreamError) -> Self {
        SessionError::AudioStream(err.to_string())
    }
}

impl From<cpal::PlayStreamError> for SessionError {
    fn from(err: cpal::PlayStreamError) -> Self {
        SessionError::AudioStream(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_and_malformed_share_user_message() {
        let rejected = SessionError::RemoteRejected {
            status: 500,
            body: "boom".to_string(),
        };
        let malformed = SessionError::MalformedResponse("not json".to_string());
        assert_eq!(rejected.user_message(), malformed.user_message());
    }

    #[test]
    fn display_includes_status_code() {
        let err = SessionError::RemoteRejected {
            status: 503,
            body: "overloaded".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("overloaded"));
    }
}
