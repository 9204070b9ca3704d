pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metadata;
pub mod model;
pub mod server;
pub mod service;
pub mod store;
pub mod validate;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing/logging
///
/// Filter comes from `RUST_LOG`, falling back to the configured default
/// level. Can only be called once per process.
pub fn init_tracing(default_level: &str, json_format: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);

    if json_format {
        registry.with(fmt::layer().json().with_target(true)).init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}
