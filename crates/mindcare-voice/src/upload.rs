//! Client for the remote emotion inference endpoint
//!
//! One assembled recording goes up as a multipart `POST /predict`; the
//! parsed [`EmotionReport`] comes back. The client is stateless between
//! calls and makes exactly one network attempt per call — retrying a stale
//! capture against a possibly-changed session is the caller's decision.

use crate::error::{SessionError, VoiceResult};
use serde::Deserialize;
use tracing::debug;

/// Local development backend, used when `MINDCARE_BACKEND_URL` is unset.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// One emotion label with its score (percentage 0-100).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EmotionScore {
    pub label: String,
    pub score: f32,
}

/// Parsed outcome of a successful upload.
///
/// Every field is optional on the wire; absence is preserved rather than
/// silently defaulted, so the presentation layer decides the fallback.
/// `emotions` keeps the server-provided order (not guaranteed sorted).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EmotionReport {
    pub primary: Option<String>,
    /// Percentage 0-100.
    pub confidence: Option<f32>,
    #[serde(default)]
    pub emotions: Vec<EmotionScore>,
}

/// Response from the backend's `GET /health` probe.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub model: Option<String>,
}

/// Uploads one assembled recording to the inference backend.
#[derive(Debug, Clone)]
pub struct UploadClient {
    /// Base URL without trailing slash (e.g. http://localhost:8000).
    base_url: String,
    client: reqwest::Client,
}

impl UploadClient {
    /// Create with an explicit base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    /// Build from environment: `MINDCARE_BACKEND_URL`, falling back to the
    /// local development address.
    pub fn from_env() -> Self {
        let base_url = std::env::var("MINDCARE_BACKEND_URL")
            .unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string());
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit one assembled recording to `POST {base}/predict`.
    ///
    /// Exactly one attempt; no internal retry and no internal timeout.
    /// An empty payload is still submitted — the server is the arbiter of
    /// whether an empty recording is valid.
    pub async fn predict(&self, payload: Vec<u8>) -> VoiceResult<EmotionReport> {
        let url = format!("{}/predict", self.base_url);
        debug!(bytes = payload.len(), %url, "uploading recording");

        let part = reqwest::multipart::Part::bytes(payload)
            .file_name("recording.wav")
            .mime_str("audio/wav")
            .map_err(|e| SessionError::Transport(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let res = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            // Body read is best-effort; diagnostics only.
            let body = res.text().await.unwrap_or_default();
            return Err(SessionError::RemoteRejected {
                status: status.as_u16(),
                body,
            });
        }

        res.json::<EmotionReport>()
            .await
            .map_err(|e| SessionError::MalformedResponse(e.to_string()))
    }

    /// Probe the backend's `GET /health` endpoint.
    pub async fn health(&self) -> VoiceResult<HealthStatus> {
        let url = format!("{}/health", self.base_url);

        let res = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(SessionError::RemoteRejected {
                status: status.as_u16(),
                body,
            });
        }

        res.json::<HealthStatus>()
            .await
            .map_err(|e| SessionError::MalformedResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_with_all_fields_absent() {
        let report: EmotionReport = serde_json::from_str("{}").unwrap();
        assert_eq!(report.primary, None);
        assert_eq!(report.confidence, None);
        assert!(report.emotions.is_empty());
    }

    #[test]
    fn report_keeps_server_emotion_order() {
        let report: EmotionReport = serde_json::from_str(
            r#"{
                "primary": "Neutral",
                "confidence": 55.2,
                "emotions": [
                    {"label": "Neutral", "score": 55.2},
                    {"label": "Calm", "score": 30.1},
                    {"label": "Sad", "score": 14.7}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(report.primary.as_deref(), Some("Neutral"));
        let labels: Vec<&str> = report.emotions.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["Neutral", "Calm", "Sad"]);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = UploadClient::new("http://10.0.0.5:8000/");
        assert_eq!(client.base_url(), "http://10.0.0.5:8000");
    }
}
