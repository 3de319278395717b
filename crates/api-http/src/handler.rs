//! HTTP Handlers
//!
//! Thin adapters between axum and the queue: the admission result's status
//! code goes straight onto the wire.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::debug;

use notifyd_core::domain::QueueState;

use crate::types::{AppState, ErrorBody, NotifyAccepted, NotifyRequest};

/// POST /notify - admit a notification
pub async fn notify(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<NotifyRequest>,
) -> Response {
    if !state.rate_limiter.check(addr.ip()).await {
        debug!(client = %addr.ip(), "Request throttled");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorBody {
                error: "Rate limit exceeded. Please slow down.".to_string(),
            }),
        )
            .into_response();
    }

    let result = state.queue.enqueue(req.into()).await;
    let code = StatusCode::from_u16(result.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if result.accepted {
        let body = NotifyAccepted {
            id: result.item_id.unwrap_or_default(),
            position: result.position.unwrap_or_default(),
            message: result.message,
        };
        (code, Json(body)).into_response()
    } else {
        (code, Json(ErrorBody { error: result.message })).into_response()
    }
}

/// GET /status - queue state snapshot, always 200
pub async fn status(State(state): State<AppState>) -> Json<QueueState> {
    Json(state.queue.state().await)
}

/// GET /health - liveness probe
pub async fn health() -> &'static str {
    "ok"
}
