//! Shelf application library
//!
//! Wires the application modules into the kernel registry and runs the HTTP
//! server around them.

pub mod modules;

use anyhow::Context;
use axum::Router;
use shelf_kernel::{InitCtx, ModuleRegistry, Settings};

/// Registry holding every application module
pub fn registry() -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry).context("failed to register modules")?;
    Ok(registry)
}

/// Fully layered router for `settings`, without binding a socket
pub fn app(settings: &Settings) -> anyhow::Result<Router> {
    Ok(shelf_http::build_router(&registry()?, settings))
}

/// Run module lifecycle and serve HTTP until a shutdown signal arrives
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let registry = registry()?;
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    let served = shelf_http::start_server(&registry, &settings).await;

    registry.stop_all().await?;
    served
}
