//! Event service: orchestrates validation, the metadata codec, and the
//! storage adapter. Stateless; every call is an independent request/response
//! transformation over the store's durable state.

use crate::error::AppError;
use crate::metadata;
use crate::model::{LogEventPayload, LogEventResponse, PageResponse, SdkInfo};
use crate::store::{EventFilter, LogStore, NewEvent, StoredEvent};
use crate::validate;

#[derive(Clone)]
pub struct LogEventService {
    store: LogStore,
}

impl LogEventService {
    pub fn new(store: LogStore) -> Self {
        Self { store }
    }

    /// Validate and persist one event.
    ///
    /// Validation failure propagates before anything touches storage, so a
    /// rejected payload never leaves a partial write.
    pub async fn ingest(&self, payload: LogEventPayload) -> Result<LogEventResponse, AppError> {
        let event = validate::validate(payload).map_err(AppError::Validation)?;

        let record = NewEvent {
            application: event.application,
            environment: event.environment,
            level: event.level,
            message: event.message,
            timestamp: event.timestamp,
            trace_id: event.trace_id,
            metadata: metadata::encode(event.metadata.as_ref()),
            sdk_language: event.sdk.as_ref().map(|s| s.language.clone()),
            sdk_version: event.sdk.map(|s| s.version),
        };

        let stored = self.store.persist(record).await?;
        tracing::debug!(id = stored.id, application = %stored.application, "event ingested");

        Ok(project(stored))
    }

    /// Filtered, paginated search over stored events, newest first.
    pub async fn search(
        &self,
        filter: EventFilter,
        page: u32,
        size: u32,
    ) -> Result<PageResponse<LogEventResponse>, AppError> {
        let (events, total_elements) = self.store.query(&filter, page, size).await?;

        let total_pages = if total_elements == 0 {
            0
        } else {
            total_elements.div_ceil(u64::from(size))
        };

        Ok(PageResponse {
            content: events.into_iter().map(project).collect(),
            page,
            size,
            total_elements,
            total_pages,
        })
    }
}

/// Project a stored row back to structured form. The metadata blob decodes
/// best-effort; the sdk sub-object is rebuilt only when both columns are
/// present.
fn project(stored: StoredEvent) -> LogEventResponse {
    let metadata = metadata::decode(stored.metadata.as_deref());

    let sdk = match (stored.sdk_language, stored.sdk_version) {
        (Some(language), Some(version)) => Some(SdkInfo { language, version }),
        _ => None,
    };

    LogEventResponse {
        id: stored.id,
        application: stored.application,
        environment: stored.environment,
        level: stored.level,
        message: stored.message,
        timestamp: stored.timestamp,
        trace_id: stored.trace_id,
        metadata,
        sdk,
    }
}
