use crate::{config::Config, error::AppError};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

const API_KEY_HEADER: &str = "X-API-KEY";

/// Authentication information attached to each authenticated request
#[derive(Debug, Clone)]
pub struct AuthInfo {
    /// Name of the API key used for authentication
    pub api_key_name: String,
}

/// API-key middleware for `/api/*` routes.
/// Validates the `X-API-KEY` header against the configured keys.
pub async fn api_key_middleware(
    State(config): State<Arc<Config>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let provided = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Missing API Key".to_string()))?;

    let key = config
        .api_keys
        .iter()
        .find(|k| k.key == provided && k.enabled)
        .ok_or_else(|| AppError::Unauthorized("Invalid API Key".to_string()))?;

    req.extensions_mut().insert(AuthInfo {
        api_key_name: key.name.clone(),
    });

    Ok(next.run(req).await)
}
