//! Shape validation of inbound event payloads.
//!
//! Every violation is collected before returning, so a client sees all
//! failing fields in a single round-trip instead of fixing them one by one.

use crate::error::FieldError;
use crate::model::{LogEvent, LogEventPayload, LogLevel, SdkInfo};

/// Validate a raw payload into a [`LogEvent`].
///
/// Pure check: no side effects, and field values pass through unchanged.
pub fn validate(payload: LogEventPayload) -> Result<LogEvent, Vec<FieldError>> {
    let mut errors = Vec::new();

    let application = require_text(payload.application, "application", "Application is required", &mut errors);
    let environment = require_text(payload.environment, "environment", "Environment is required", &mut errors);
    let message = require_text(payload.message, "message", "Message is required", &mut errors);

    let level = match payload.level.as_deref() {
        None => {
            errors.push(FieldError::new("level", "Level is required"));
            None
        }
        Some(raw) => match raw.parse::<LogLevel>() {
            Ok(level) => Some(level),
            Err(_) => {
                errors.push(FieldError::new(
                    "level",
                    "Level must be one of TRACE, DEBUG, INFO, WARN, ERROR, FATAL",
                ));
                None
            }
        },
    };

    if payload.timestamp.is_none() {
        errors.push(FieldError::new("timestamp", "Timestamp is required"));
    }

    let sdk = match payload.sdk {
        None => None,
        Some(sdk) => {
            let language = require_text(sdk.language, "sdk.language", "SDK language is required", &mut errors);
            let version = require_text(sdk.version, "sdk.version", "SDK version is required", &mut errors);
            match (language, version) {
                (Some(language), Some(version)) => Some(SdkInfo { language, version }),
                _ => None,
            }
        }
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    // All unwraps below are guarded by the error checks above
    Ok(LogEvent {
        application: application.unwrap(),
        environment: environment.unwrap(),
        level: level.unwrap(),
        message: message.unwrap(),
        timestamp: payload.timestamp.unwrap(),
        trace_id: payload.trace_id,
        metadata: payload.metadata,
        sdk,
    })
}

/// Missing or blank text fields both count as absent.
fn require_text(
    value: Option<String>,
    field: &str,
    message: &str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match value {
        Some(s) if !s.trim().is_empty() => Some(s),
        _ => {
            errors.push(FieldError::new(field, message));
            None
        }
    }
}
