//! HTTP API handlers
//!
//! Parameter parsing happens here, at the boundary: a malformed level or
//! instant never reaches the storage layer.

use crate::config::Config;
use crate::error::AppError;
use crate::model::{LogEventPayload, LogEventResponse, LogLevel, PageResponse};
use crate::service::LogEventService;
use crate::store::EventFilter;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Shared state for the HTTP API
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub service: LogEventService,
}

/// Query parameters for `GET /api/logs`. Filters stay raw strings here and
/// are parsed explicitly so bad input gets a structured 400.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub application: Option<String>,
    pub environment: Option<String>,
    pub level: Option<String>,
    /// Inclusive lower timestamp bound, RFC 3339
    pub from: Option<String>,
    /// Inclusive upper timestamp bound, RFC 3339
    pub to: Option<String>,
    #[serde(default)]
    pub page: i64,
    #[serde(default = "default_size")]
    pub size: i64,
}

fn default_size() -> i64 {
    20
}

/// POST /api/logs - Ingest one log event
pub async fn ingest(
    State(state): State<AppState>,
    payload: Result<Json<LogEventPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) =
        payload.map_err(|e| AppError::InvalidParameter(format!("Malformed request body: {e}")))?;

    let response = state.service.ingest(payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/logs - Search stored events with optional filters
///
/// Example: GET /api/logs?application=checkout&level=ERROR&page=0&size=20
pub async fn search(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<PageResponse<LogEventResponse>>, AppError> {
    let Query(params) =
        params.map_err(|e| AppError::InvalidParameter(format!("Malformed query string: {e}")))?;

    let (filter, page, size) = parse_search_params(params)?;
    let response = state.service.search(filter, page, size).await?;
    Ok(Json(response))
}

fn parse_search_params(params: SearchParams) -> Result<(EventFilter, u32, u32), AppError> {
    let level = params
        .level
        .as_deref()
        .map(|raw| raw.parse::<LogLevel>())
        .transpose()
        .map_err(|e| AppError::InvalidParameter(e.to_string()))?;

    let filter = EventFilter {
        application: params.application,
        environment: params.environment,
        level,
        from: parse_instant(params.from.as_deref(), "from")?,
        to: parse_instant(params.to.as_deref(), "to")?,
    };

    if params.page < 0 {
        return Err(AppError::InvalidParameter(
            "'page' must not be negative".to_string(),
        ));
    }
    if params.size <= 0 {
        return Err(AppError::InvalidParameter(
            "'size' must be positive".to_string(),
        ));
    }
    let page = u32::try_from(params.page)
        .map_err(|_| AppError::InvalidParameter("'page' is out of range".to_string()))?;
    let size = u32::try_from(params.size)
        .map_err(|_| AppError::InvalidParameter("'size' is out of range".to_string()))?;

    Ok((filter, page, size))
}

fn parse_instant(raw: Option<&str>, name: &str) -> Result<Option<DateTime<Utc>>, AppError> {
    raw.map(|s| {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| {
                AppError::InvalidParameter(format!("'{name}' must be an RFC 3339 instant"))
            })
    })
    .transpose()
}

/// GET /health - liveness probe, no auth required
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "UP",
        "application": "loghub-api",
    }))
}

/// GET / - service info, no auth required
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "LogHub API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Central log ingestion and query API",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SearchParams {
        SearchParams {
            application: None,
            environment: None,
            level: None,
            from: None,
            to: None,
            page: 0,
            size: 20,
        }
    }

    #[test]
    fn test_defaults_when_params_absent() {
        let parsed: SearchParams = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.page, 0);
        assert_eq!(parsed.size, 20);
        assert!(parsed.level.is_none());
    }

    #[test]
    fn test_parse_level_filter() {
        let mut p = params();
        p.level = Some("ERROR".to_string());

        let (filter, _, _) = parse_search_params(p).unwrap();
        assert_eq!(filter.level, Some(LogLevel::Error));
    }

    #[test]
    fn test_unknown_level_is_caller_error() {
        let mut p = params();
        p.level = Some("LOUD".to_string());

        let err = parse_search_params(p).unwrap_err();
        assert!(matches!(err, AppError::InvalidParameter(_)));
    }

    #[test]
    fn test_parse_time_bounds() {
        let mut p = params();
        p.from = Some("2024-01-01T00:00:00Z".to_string());
        p.to = Some("2024-06-30T23:59:59+02:00".to_string());

        let (filter, _, _) = parse_search_params(p).unwrap();
        assert!(filter.from.is_some());
        assert!(filter.to.is_some());
    }

    #[test]
    fn test_malformed_instant_is_caller_error() {
        let mut p = params();
        p.from = Some("yesterday".to_string());

        let err = parse_search_params(p).unwrap_err();
        assert!(matches!(err, AppError::InvalidParameter(_)));
    }

    #[test]
    fn test_negative_page_rejected() {
        let mut p = params();
        p.page = -1;

        assert!(parse_search_params(p).is_err());
    }

    #[test]
    fn test_zero_size_rejected() {
        let mut p = params();
        p.size = 0;

        assert!(parse_search_params(p).is_err());
    }
}
