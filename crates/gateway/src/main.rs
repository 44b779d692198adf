//! Pagewise API Gateway
//!
//! HTTP boundary of the question-answering engine:
//! - Document ingestion (replaces the loaded document)
//! - Question answering over the loaded document
//! - Page structure export
//! - Observability (logging, metrics, request ids)

mod handlers;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder};
use pagewise_common::config::{AppConfig, ObservabilityConfig};
use pagewise_common::{metrics, telemetry, Runtime, VERSION};
use pagewise_ingestion::DocumentIngestor;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{error, info};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<Runtime>,
    pub ingestor: Arc<DocumentIngestor>,
}

impl AppState {
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let ingestor = DocumentIngestor::new(&config.chunking)?;
        let runtime = Runtime::from_config(config)?;
        Ok(Self {
            runtime: Arc::new(runtime),
            ingestor: Arc::new(ingestor),
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    telemetry::init_tracing(&config.observability, std::io::stdout)?;
    info!(
        service = %config.observability.service_name,
        "Starting Pagewise API Gateway v{}", VERSION
    );

    metrics::register_metrics();
    if config.observability.metrics_port != 0 {
        let metrics_addr = SocketAddr::from(([0, 0, 0, 0], config.observability.metrics_port));
        prometheus_builder(&config.observability)?
            .with_http_listener(metrics_addr)
            .install()?;
        info!("Metrics exporter listening on {}", metrics_addr);
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let state = AppState::from_config(config)?;
    let app = create_router(state);

    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Exporter with latency buckets and the service label
fn prometheus_builder(config: &ObservabilityConfig) -> Result<PrometheusBuilder, BuildError> {
    PrometheusBuilder::new()
        .add_global_label("service", config.service_name.clone())
        .set_buckets_for_metric(
            Matcher::Suffix("duration_seconds".to_string()),
            metrics::LATENCY_BUCKETS,
        )
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    let max_body_bytes = state.runtime.config().server.max_body_bytes;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    let api_routes = Router::new()
        // one question at a time
        .route(
            "/ask",
            post(handlers::ask::ask).layer(ConcurrencyLimitLayer::new(1)),
        )
        .route("/documents", post(handlers::documents::ingest))
        .route(
            "/documents/current/structure",
            get(handlers::documents::current_structure),
        );

    Router::new()
        .route("/health", get(handlers::health::health))
        .nest("/v1", api_routes)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // request_id must wrap propagate_id
        .layer(propagate_id)
        .layer(request_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
