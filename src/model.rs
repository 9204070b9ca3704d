//! Wire and domain types for log events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a log event. Closed set; anything else is a caller-input error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TRACE" => Ok(Self::Trace),
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARN" => Ok(Self::Warn),
            "ERROR" => Ok(Self::Error),
            "FATAL" => Ok(Self::Fatal),
            _ => Err(UnknownLevel(s.to_string())),
        }
    }
}

/// Returned when a level string is not one of the recognized values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLevel(pub String);

impl fmt::Display for UnknownLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown level '{}', expected one of TRACE, DEBUG, INFO, WARN, ERROR, FATAL",
            self.0
        )
    }
}

impl std::error::Error for UnknownLevel {}

/// SDK identification attached by client libraries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkInfo {
    pub language: String,
    pub version: String,
}

/// Inbound event payload, before validation.
///
/// Every field is optional at this stage so validation can report all
/// missing fields in one pass instead of failing on the first.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEventPayload {
    pub application: Option<String>,
    pub environment: Option<String>,
    pub level: Option<String>,
    pub message: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub trace_id: Option<String>,
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
    pub sdk: Option<SdkPayload>,
}

/// Inbound sdk sub-object, pre-validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SdkPayload {
    pub language: Option<String>,
    pub version: Option<String>,
}

/// A validated log event, ready for storage.
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub application: String,
    pub environment: String,
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub trace_id: Option<String>,
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
    pub sdk: Option<SdkInfo>,
}

/// Outbound projection of a stored event.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEventResponse {
    pub id: i64,
    pub application: String,
    pub environment: String,
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub trace_id: Option<String>,
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
    pub sdk: Option<SdkInfo>,
}

/// One page of a filtered result set.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    /// Zero-based page index.
    pub page: u32,
    /// Requested page size.
    pub size: u32,
    /// Total matching records across all pages.
    pub total_elements: u64,
    /// ceil(total_elements / size); 0 when total_elements is 0.
    pub total_pages: u64,
}
