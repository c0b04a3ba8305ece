//! Chat Relay Backend
//!
//! A REST API server for a browser chat interface. Stores conversations in
//! SQLite and forwards prompts to the selected model provider.

use axum::{extract::Request, middleware::Next, response::Response, routing::get, Json, Router};
use chat_relay_backend::api;
use chat_relay_backend::chat::ChatDb;
use chat_relay_backend::config::Config;
use chat_relay_backend::conversation::ConversationController;
use chat_relay_backend::providers::ModelRegistry;
use chat_relay_backend::state::{AppState, SessionLocator};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    message: String,
}

/// Request ID middleware - adds unique ID to each request for tracing
async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        uri = %uri,
    );

    let response = next.run(request).instrument(span).await;

    let duration = start.elapsed();
    info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        status = %response.status().as_u16(),
        duration_ms = duration.as_millis(),
        "Request completed"
    );

    response
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded: {:?}", config);

    info!(data_dir = %config.persistence.data_dir.display(), "Using data directory");
    let db_path = config.persistence.db_path.to_string_lossy().to_string();
    let chat_db = Arc::new(ChatDb::new(&db_path).await?);

    let locator = SessionLocator::new(config.persistence.session_state_path.clone());
    let http_client = reqwest::Client::new();
    let registry = Arc::new(ModelRegistry::from_config(&config.providers, http_client));
    info!(models = ?registry.models(), "Model registry ready");

    let controller = ConversationController::new(
        chat_db.clone(),
        locator,
        registry,
        config.generation.timeout(),
    );
    match controller.resume().await {
        Ok(Some(session_id)) => info!(session_id = session_id, "Resuming last chat session"),
        Ok(None) => info!("No chat session to resume"),
        Err(e) => tracing::warn!("Failed to resume chat session: {}", e),
    }

    let app_state = Arc::new(AppState::new(controller, config.generation.clone()));

    let app = Router::new()
        .route("/api/health", get(health_check))
        .merge(api::router(app_state))
        // Middleware (order matters - request_id should be first)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(CorsLayer::permissive()); // Browser UI may be served from another origin

    // Bind to address from config
    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid server address: {}", e))?;

    info!("Server running on http://{}", addr);
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // Setup graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    chat_db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Handle graceful shutdown signals (Ctrl+C, SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
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
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        message: "Backend is healthy".to_string(),
    })
}
