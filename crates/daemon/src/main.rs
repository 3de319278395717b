//! notifyd - Main Entry Point
//! HTTP admission + single-worker spoken playback, drained on shutdown.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use notifyd_api_http::rate_limiter::RateLimiter;
use notifyd_api_http::{serve, AppState, HttpServerConfig};
use notifyd_core::domain::QueueConfig;
use notifyd_core::port::id_provider::UuidProvider;
use notifyd_core::port::time_provider::SystemTimeProvider;
use notifyd_core::NotificationQueue;
use notifyd_infra_speech::{SpeakerConfig, SubprocessSpeaker};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parse an env var, falling back to a default on absence or parse failure.
fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging
    let log_format = std::env::var("NOTIFYD_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("notifyd=info"))
        .expect("Failed to create env filter");

    match log_format.as_str() {
        "json" => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            // Development: pretty formatting with colors
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }

    info!("notifyd v{} starting...", VERSION);

    // 2. Load configuration from environment
    let queue_config = QueueConfig::new(
        env_parse("NOTIFYD_MAX_DEPTH", 100),
        env_parse("NOTIFYD_DEGRADED_THRESHOLD", 50),
        Duration::from_millis(env_parse("NOTIFYD_DRAIN_TIMEOUT_MS", 30_000)),
    );

    let speaker_defaults = SpeakerConfig::default();
    let speaker_config = SpeakerConfig {
        program: env_string("NOTIFYD_TTS_PROGRAM", &speaker_defaults.program),
        default_voice: env_string("NOTIFYD_DEFAULT_VOICE", &speaker_defaults.default_voice),
        speech_timeout: Duration::from_millis(env_parse(
            "NOTIFYD_SPEECH_TIMEOUT_MS",
            speaker_defaults.speech_timeout.as_millis() as u64,
        )),
    };

    let http_defaults = HttpServerConfig::default();
    let http_config = HttpServerConfig {
        host: env_string("NOTIFYD_HTTP_HOST", &http_defaults.host),
        port: env_parse("NOTIFYD_HTTP_PORT", http_defaults.port),
    };

    let rate_limit_burst: u32 = env_parse("NOTIFYD_RATE_LIMIT_BURST", 10);
    let rate_limit_rate: u32 = env_parse("NOTIFYD_RATE_LIMIT_RATE", 5);

    // 3. Setup dependencies (DI wiring)
    info!(program = %speaker_config.program, voice = %speaker_config.default_voice, "Configuring speech processor");
    let speaker = Arc::new(SubprocessSpeaker::new(speaker_config));

    let queue = NotificationQueue::new(
        queue_config,
        speaker,
        Arc::new(SystemTimeProvider),
        Arc::new(UuidProvider),
    );

    let state = AppState {
        queue: queue.clone(),
        rate_limiter: Arc::new(RateLimiter::new(rate_limit_burst, rate_limit_rate)),
    };

    // 4. Start HTTP server with graceful shutdown hook
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);
    let server_shutdown = async move {
        let _ = shutdown_rx.changed().await;
    };

    let server_handle = tokio::spawn(serve(http_config, state, server_shutdown));

    info!("System ready. Waiting for notifications...");
    info!("Press Ctrl+C to shutdown");

    // 5. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Draining queue...");

    // 6. Graceful shutdown: stop admissions, let queued speech finish
    let _ = shutdown_tx.send(true);

    let drain = queue.drain().await;
    if drain.timed_out {
        // Best effort only: log and exit anyway
        error!(
            remaining = drain.remaining,
            items_processed = drain.items_processed,
            items_failed = drain.items_failed,
            "Drain timed out; exiting with items unspoken"
        );
    } else {
        info!(
            items_processed = drain.items_processed,
            items_failed = drain.items_failed,
            "Queue drained"
        );
    }

    match tokio::time::timeout(Duration::from_secs(5), server_handle).await {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(e))) => error!(error = %e, "HTTP server exited with error"),
        Ok(Err(e)) => error!(error = %e, "HTTP server task panicked"),
        Err(_) => error!("HTTP server did not stop in time"),
    }

    info!("Shutdown complete.");
    Ok(())
}
