//! Bookshelf application library
//!
//! Wires the application modules into the kernel registry and runs the HTTP
//! server until shutdown.

pub mod modules;

/// Re-export commonly used types
pub use modules::*;

use anyhow::Context;
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

/// Build a registry holding every application module
pub fn build_registry() -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry).context("failed to register modules")?;
    Ok(registry)
}

/// Initialize and start all modules, serve HTTP until a shutdown signal,
/// then stop the modules again.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let registry = build_registry()?;
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    let served = bookshelf_http::start_server(&registry, &settings).await;
    if let Err(err) = &served {
        tracing::error!(error = %err, "HTTP server exited with an error");
    }

    registry.stop_all().await?;
    tracing::info!("bookshelf shutdown complete");
    served
}
