use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    auth, config::Config, handlers, handlers::AppState, service::LogEventService, store::LogStore,
};

/// Start the LogHub API server
///
/// Opens the database, builds the router, binds to the configured address
/// and serves until ctrl-c.
pub async fn start_server(config: Config) -> Result<()> {
    let store = LogStore::connect(&config.database.url, config.database.max_connections).await?;
    let service = LogEventService::new(store);

    let config = Arc::new(config);
    let app = create_router(config.clone(), service);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    info!("Starting LogHub API on {}", addr);
    info!(
        "Configuration: {} API keys, {} allowed CORS origins",
        config.api_keys.len(),
        config.cors.allowed_origins.len()
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received, draining connections...");
        })
        .await?;

    info!("Server stopped gracefully");
    Ok(())
}

/// Create the axum router with all routes and middleware
pub fn create_router(config: Arc<Config>, service: LogEventService) -> Router {
    let state = AppState {
        config: config.clone(),
        service,
    };

    // Everything under /api requires an API key
    let api_routes = Router::new()
        .route("/api/logs", post(handlers::ingest).get(handlers::search))
        .layer(middleware::from_fn_with_state(
            config.clone(),
            auth::api_key_middleware,
        ))
        .with_state(state);

    Router::new()
        // Public endpoints (no auth required)
        .route("/health", get(handlers::health))
        .route("/", get(handlers::root))
        .merge(api_routes)
        .layer(build_cors_layer(&config))
        // Cap request bodies at 1MB; log events are small
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(TraceLayer::new_for_http())
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "skipping unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(tower_http::cors::Any)
}
