//! MindCare Screening CLI
//!
//! Drives one fixed-length voice screening session end to end: probe the
//! backend, record from the default microphone for 15 seconds (Ctrl+C
//! cancels), upload the capture, and print the emotion report. The
//! wall-clock bound lives here, not in the controller — the core only
//! exposes the start/stop surface.

use mindcare_voice::{AudioConfig, MicBackend, ScreeningController, UploadClient};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Matches the screening flow in the app: "speak for 15 seconds".
const SESSION_SECONDS: u64 = 15;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Load .env file if present (before any env::var calls)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let uploader = UploadClient::from_env();
    tracing::info!(backend = %uploader.base_url(), "MindCare voice screening");

    match uploader.health().await {
        Ok(health) => tracing::info!(
            status = %health.status,
            model = health.model.as_deref().unwrap_or("unknown"),
            "Backend healthy"
        ),
        Err(e) => tracing::warn!(error = %e, "Backend health check failed; continuing anyway"),
    }

    let mut controller =
        ScreeningController::new(MicBackend, uploader, AudioConfig::default());

    if let Err(e) = controller.start() {
        tracing::error!(error = %e, "Could not start recording");
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }

    println!("Recording for {SESSION_SECONDS} seconds — speak freely. Ctrl+C cancels.");

    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(SESSION_SECONDS)) => {}
        _ = tokio::signal::ctrl_c() => {
            controller.cancel();
            println!("\nScreening cancelled; nothing was uploaded.");
            return;
        }
    }

    match controller.stop().await {
        Ok(report) => {
            println!(
                "\nPrimary emotion: {} ({}% confidence)",
                report.primary.as_deref().unwrap_or("unknown"),
                report
                    .confidence
                    .map(|c| format!("{c:.0}"))
                    .unwrap_or_else(|| "?".into()),
            );
            if !report.emotions.is_empty() {
                println!("\nFull breakdown:");
                for emotion in &report.emotions {
                    println!("  {:<12} {:>5.1}%", emotion.label, emotion.score);
                }
            }
        }
        Err(e) => {
            eprintln!("{}", e.user_message());
            std::process::exit(1);
        }
    }
}
