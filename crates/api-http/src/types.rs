//! HTTP Request/Response Types

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use notifyd_core::domain::NotificationRequest;
use notifyd_core::NotificationQueue;

use crate::rate_limiter::RateLimiter;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub queue: NotificationQueue,
    pub rate_limiter: Arc<RateLimiter>,
}

/// POST /notify request body
#[derive(Debug, Deserialize)]
pub struct NotifyRequest {
    pub text: String,
    #[serde(default)]
    pub voice: Option<String>,
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default)]
    pub rate: Option<f64>,
    #[serde(default)]
    pub pitch: Option<f64>,
}

impl From<NotifyRequest> for NotificationRequest {
    fn from(req: NotifyRequest) -> Self {
        Self {
            text: req.text,
            voice: req.voice,
            volume: req.volume,
            rate: req.rate,
            pitch: req.pitch,
        }
    }
}

/// 201 response body for an admitted notification
#[derive(Debug, Clone, Serialize)]
pub struct NotifyAccepted {
    pub id: String,
    /// Position at enqueue time; informational only.
    pub position: usize,
    pub message: String,
}

/// Error response body (400/429/503)
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
}
