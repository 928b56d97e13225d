//! Upload client tests against an in-process HTTP fixture
//!
//! Each test stands up a throwaway axum server on a loopback port, so the
//! full reqwest request path (multipart encoding, status classification,
//! JSON parsing) is exercised without a real inference backend.

use axum::body::Body;
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;

use mindcare_voice::{SessionError, UploadClient};

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fixture server");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn json_response(status: u16, body: &str) -> Response {
    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn predict_parses_full_response() {
    let app = Router::new().route(
        "/predict",
        post(|| async {
            json_response(
                200,
                r#"{
                    "primary": "Happy",
                    "confidence": 72.4,
                    "emotions": [
                        {"label": "Happy", "score": 72.4},
                        {"label": "Neutral", "score": 20.0},
                        {"label": "Sad", "score": 7.6}
                    ]
                }"#,
            )
        }),
    );
    let client = UploadClient::new(serve(app).await);

    let report = client.predict(vec![0u8; 256]).await.unwrap();
    assert_eq!(report.primary.as_deref(), Some("Happy"));
    assert_eq!(report.confidence, Some(72.4));
    assert_eq!(report.emotions.len(), 3);
    assert_eq!(report.emotions[0].label, "Happy");
    assert_eq!(report.emotions[2].label, "Sad");
}

#[tokio::test]
async fn non_success_status_is_remote_rejected_with_body() {
    let app = Router::new().route(
        "/predict",
        post(|| async { json_response(500, r#"{"detail":"ffmpeg conversion failed"}"#) }),
    );
    let client = UploadClient::new(serve(app).await);

    let err = client.predict(vec![1u8; 8]).await.unwrap_err();
    match err {
        SessionError::RemoteRejected { status, body } => {
            assert_eq!(status, 500);
            assert!(body.contains("ffmpeg conversion failed"));
        }
        other => panic!("expected RemoteRejected, got {:?}", other),
    }
}

#[tokio::test]
async fn success_status_with_bad_json_is_malformed_response() {
    let app = Router::new().route(
        "/predict",
        post(|| async { json_response(200, "<html>definitely not json</html>") }),
    );
    let client = UploadClient::new(serve(app).await);

    let err = client.predict(vec![1u8; 8]).await.unwrap_err();
    assert!(matches!(err, SessionError::MalformedResponse(_)));
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    // Bind then immediately drop to get a port with nothing listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = UploadClient::new(format!("http://{}", addr));
    let err = client.predict(vec![0u8; 4]).await.unwrap_err();
    assert!(matches!(err, SessionError::Transport(_)));
}

#[tokio::test]
async fn health_probe_parses_status_and_model() {
    let app = Router::new().route(
        "/health",
        get(|| async {
            json_response(
                200,
                r#"{"status": "ok", "model": "superb/wav2vec2-large-superb-er"}"#,
            )
        }),
    );
    let client = UploadClient::new(serve(app).await);

    let health = client.health().await.unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(
        health.model.as_deref(),
        Some("superb/wav2vec2-large-superb-er")
    );
}

#[tokio::test]
async fn health_probe_classifies_server_errors() {
    let app = Router::new().route("/health", get(|| async { json_response(503, "down") }));
    let client = UploadClient::new(serve(app).await);

    let err = client.health().await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::RemoteRejected { status: 503, .. }
    ));
}
