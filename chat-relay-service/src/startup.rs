//! Router assembly and server lifecycle.

use crate::config::RelayConfig;
use crate::error::panic_response;
use crate::handlers;
use crate::services::providers::groq::{GroqConfig, GroqProvider};
use crate::services::providers::ChatProvider;
use crate::services::ChatRelay;
use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    create_ip_rate_limiter, ip_rate_limit_middleware, make_request_span, metrics_middleware,
    request_id_middleware, IpRateLimitState,
};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Inline base64 images make chat bodies large.
pub const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: RelayConfig,
    pub relay: ChatRelay,
    pub rate_limit: IpRateLimitState,
}

impl AppState {
    pub fn new(config: RelayConfig, provider: Arc<dyn ChatProvider>) -> Self {
        let relay = ChatRelay::new(provider, config.models.clone());
        let rate_limit = IpRateLimitState::new(
            create_ip_rate_limiter(
                config.rate_limit.max_requests,
                config.rate_limit.window_secs,
            ),
            config.rate_limit.trust_forwarded,
        );

        Self {
            config,
            relay,
            rate_limit,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/api/chat", post(handlers::chat))
        .route("/api/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        .fallback_service(ServeDir::new(&state.config.static_dir))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(from_fn(request_id_middleware))
        .layer(from_fn_with_state(
            state.rate_limit.clone(),
            ip_rate_limit_middleware,
        ))
        .layer(cors)
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
}

impl Application {
    /// Build against the real upstream described by `config`.
    pub async fn build(config: RelayConfig) -> Result<Self, AppError> {
        let provider = GroqProvider::new(GroqConfig {
            api_key: config.upstream.api_key.clone(),
            base_url: config.upstream.base_url.clone(),
            timeout: Duration::from_secs(config.upstream.timeout_secs),
        })
        .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?;

        tracing::info!(
            base_url = %config.upstream.base_url,
            timeout_secs = config.upstream.timeout_secs,
            text_model = %config.models.text_model,
            vision_model = %config.models.vision_model,
            "Initialized Groq provider"
        );

        Self::build_with_provider(config, Arc::new(provider)).await
    }

    /// Build with an explicit provider (port 0 = random port for testing).
    pub async fn build_with_provider(
        config: RelayConfig,
        provider: Arc<dyn ChatProvider>,
    ) -> Result<Self, AppError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let state = AppState::new(config, provider);
        let app = build_router(state);

        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Server running at http://localhost:{}", port);

        let server = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal());

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
