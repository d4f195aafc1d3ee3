//! Bookshelf application library
//!
//! Wires the application modules into the kernel registry and runs the HTTP
//! server over them.

use anyhow::Context;
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

pub mod modules;

/// Registry with every application module registered
pub fn build_registry() -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry);
    registry
}

/// Run the full module lifecycle around the HTTP server.
///
/// Modules are stopped even when the server exits with an error.
pub async fn run(settings: &Settings) -> anyhow::Result<()> {
    let registry = build_registry();
    let ctx = InitCtx { settings };

    registry
        .init_modules(&ctx)
        .await
        .context("module initialization failed")?;
    registry
        .start_modules(&ctx)
        .await
        .context("module startup failed")?;

    let served = bookshelf_http::start_server(&registry, settings).await;

    registry
        .stop_modules()
        .await
        .context("module shutdown failed")?;

    served
}
