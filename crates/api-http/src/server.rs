//! HTTP Server
//!
//! Binds the axum router and serves until the shutdown future resolves.
//! Binds to localhost by default; CORS is permissive unless restricted via
//! `NOTIFYD_CORS_ALLOW_ORIGIN` (comma-separated origins).

use std::future::Future;
use std::net::SocketAddr;

use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::info;

use crate::handler;
use crate::types::AppState;

const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
const DEFAULT_HTTP_PORT: u16 = 8719;

/// HTTP Server Configuration
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HTTP_HOST.to_string(),
            port: DEFAULT_HTTP_PORT,
        }
    }
}

/// Create CORS layer based on environment configuration.
///
/// Set `NOTIFYD_CORS_ALLOW_ORIGIN` for production (comma-separated list of
/// origins). If not set, allows all origins.
pub fn create_cors_layer() -> CorsLayer {
    let allowed_origins = std::env::var("NOTIFYD_CORS_ALLOW_ORIGIN").ok();

    match allowed_origins {
        Some(origins) if !origins.is_empty() && origins != "*" => {
            let origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods([Method::GET, Method::POST])
                .allow_headers(Any)
        }
        _ => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(Any),
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/notify", post(handler::notify))
        .route("/status", get(handler::status))
        .route("/health", get(handler::health))
        .layer(create_cors_layer())
        .with_state(state)
}

/// Serve HTTP until `shutdown` resolves, then finish in-flight requests.
pub async fn serve(
    config: HttpServerConfig,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(host = %config.host, port = config.port, "HTTP server listening");

    axum::serve(
        listener,
        build_router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
}
