//! HTTP server facade for bookshelf with Axum, error handling, and OpenAPI support.

use anyhow::Context;
use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use bookshelf_kernel::{settings::Settings, ModuleRegistry};

pub mod error;
pub mod router;

pub use error::{AppError, AppResult};
use router::RouterBuilder;

/// Start the HTTP server with the given module registry
///
/// Returns once a shutdown signal has been received and in-flight requests
/// have drained.
pub async fn start_server(registry: &ModuleRegistry, settings: &Settings) -> anyhow::Result<()> {
    let app = build_router(registry, settings)
        .await
        .context("failed to build HTTP router")?;

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    tracing::info!("HTTP server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Build the main HTTP router with all module routes mounted
pub async fn build_router(registry: &ModuleRegistry, settings: &Settings) -> anyhow::Result<Router> {
    let base_path = settings.server.base_path.as_str();

    let mut router_builder = RouterBuilder::new()
        .route("/", get(welcome))
        .route("/health", get(health))
        .route("/healthz", get(health_check));

    let mount_point = if base_path.is_empty() { "/" } else { base_path };
    for module in registry.modules() {
        tracing::info!(
            module = module.name(),
            mount_point,
            "mounting module routes"
        );
        router_builder = router_builder.mount_module(base_path, module.routes());
    }

    router_builder = router_builder
        .with_openapi(registry, base_path)
        .with_timeout(settings.server.request_timeout_ms)
        .with_cors(&settings.server.cors_allowed_origins)
        .with_tracing()
        .with_request_id();

    Ok(router_builder.build())
}

/// Welcome endpoint
async fn welcome() -> Json<Value> {
    Json(json!({ "message": "bienvenido a la API de gestión de libros" }))
}

/// JSON health endpoint
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Plain-text health endpoint for probes
async fn health_check() -> &'static str {
    "ok"
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
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

    tracing::info!("shutdown signal received");
}
