//! SQLite storage layer for log events
//!
//! This module provides async database operations with:
//! - Connection pooling
//! - Automatic migrations
//! - Filtered, paginated queries computed in SQL
//! - WAL mode for concurrent reads/writes

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::model::LogLevel;

/// Backing store failure. Distinct from an empty result set, which is not
/// an error.
#[derive(Debug, Error)]
#[error("storage error: {0}")]
pub struct StorageError(#[from] sqlx::Error);

/// Candidate record handed to [`LogStore::persist`]; the id is assigned by
/// the store.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub application: String,
    pub environment: String,
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub trace_id: Option<String>,
    /// Opaque metadata blob, already encoded.
    pub metadata: Option<String>,
    pub sdk_language: Option<String>,
    pub sdk_version: Option<String>,
}

/// Persisted event row. Immutable once written; this store exposes no
/// update or delete.
#[derive(Debug, Clone)]
pub struct StoredEvent {
    pub id: i64,
    pub application: String,
    pub environment: String,
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub trace_id: Option<String>,
    pub metadata: Option<String>,
    pub sdk_language: Option<String>,
    pub sdk_version: Option<String>,
}

/// Optional query predicates. An absent field imposes no constraint on that
/// dimension; present fields are AND-combined.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Exact match on application name
    pub application: Option<String>,

    /// Exact match on environment name
    pub environment: Option<String>,

    /// Exact match on one level
    pub level: Option<LogLevel>,

    /// Inclusive lower bound on timestamp
    pub from: Option<DateTime<Utc>>,

    /// Inclusive upper bound on timestamp
    pub to: Option<DateTime<Utc>>,
}

/// Log event store backed by a SQLite connection pool.
#[derive(Clone)]
pub struct LogStore {
    pool: SqlitePool,
}

impl LogStore {
    /// Open (or create) the database and run pending migrations.
    ///
    /// # Arguments
    ///
    /// * `database_url` - SQLite database path (e.g., "sqlite:./data/loghub.db")
    /// * `max_connections` - pool size; use 1 for `sqlite::memory:` so all
    ///   queries share the same in-memory database
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal) // concurrent readers during writes
            .busy_timeout(Duration::from_secs(30))
            .pragma("synchronous", "NORMAL")
            .pragma("temp_store", "memory");

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await
            .context("Failed to connect to log database")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run log database migrations")?;

        tracing::info!("log database ready");
        Ok(Self { pool })
    }

    /// Insert one event and return the stored row with its assigned id.
    ///
    /// Id uniqueness under concurrent callers comes from SQLite's rowid
    /// allocation, not from application-level coordination.
    pub async fn persist(&self, event: NewEvent) -> Result<StoredEvent, StorageError> {
        let result = sqlx::query(
            "INSERT INTO log_events
                (application, environment, level, message, timestamp, trace_id, metadata, sdk_language, sdk_version)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&event.application)
        .bind(&event.environment)
        .bind(event.level.as_str())
        .bind(&event.message)
        .bind(event.timestamp.timestamp_millis())
        .bind(&event.trace_id)
        .bind(&event.metadata)
        .bind(&event.sdk_language)
        .bind(&event.sdk_version)
        .execute(&self.pool)
        .await?;

        Ok(StoredEvent {
            id: result.last_insert_rowid(),
            application: event.application,
            environment: event.environment,
            level: event.level,
            message: event.message,
            timestamp: truncate_to_millis(event.timestamp),
            trace_id: event.trace_id,
            metadata: event.metadata,
            sdk_language: event.sdk_language,
            sdk_version: event.sdk_version,
        })
    }

    /// Return one page of matching events plus the total count over the full
    /// filtered set.
    ///
    /// Results are always ordered newest first (timestamp descending, id
    /// descending as tie-break); this is a fixed contract, not configurable.
    pub async fn query(
        &self,
        filter: &EventFilter,
        page: u32,
        size: u32,
    ) -> Result<(Vec<StoredEvent>, u64), StorageError> {
        let where_clause = build_where_clause(filter);

        let count_sql = format!("SELECT COUNT(*) FROM log_events{where_clause}");
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(application) = &filter.application {
            count_query = count_query.bind(application);
        }
        if let Some(environment) = &filter.environment {
            count_query = count_query.bind(environment);
        }
        if let Some(level) = filter.level {
            count_query = count_query.bind(level.as_str());
        }
        if let Some(from) = filter.from {
            count_query = count_query.bind(from.timestamp_millis());
        }
        if let Some(to) = filter.to {
            count_query = count_query.bind(to.timestamp_millis());
        }
        let total = count_query.fetch_one(&self.pool).await? as u64;

        let page_sql = format!(
            "SELECT id, application, environment, level, message, timestamp,
                    trace_id, metadata, sdk_language, sdk_version
             FROM log_events{where_clause}
             ORDER BY timestamp DESC, id DESC
             LIMIT ? OFFSET ?"
        );
        let mut page_query = sqlx::query(&page_sql);
        if let Some(application) = &filter.application {
            page_query = page_query.bind(application);
        }
        if let Some(environment) = &filter.environment {
            page_query = page_query.bind(environment);
        }
        if let Some(level) = filter.level {
            page_query = page_query.bind(level.as_str());
        }
        if let Some(from) = filter.from {
            page_query = page_query.bind(from.timestamp_millis());
        }
        if let Some(to) = filter.to {
            page_query = page_query.bind(to.timestamp_millis());
        }
        let offset = i64::from(page) * i64::from(size);
        let rows = page_query
            .bind(i64::from(size))
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let events = rows.into_iter().map(row_to_event).collect();
        Ok((events, total))
    }

    /// Total number of stored events, filters aside.
    pub async fn count_all(&self) -> Result<u64, StorageError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM log_events")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}

/// Build the WHERE clause; bind order at the call sites must match the
/// placeholder order emitted here.
fn build_where_clause(filter: &EventFilter) -> String {
    let mut clause = String::from(" WHERE 1=1");
    if filter.application.is_some() {
        clause.push_str(" AND application = ?");
    }
    if filter.environment.is_some() {
        clause.push_str(" AND environment = ?");
    }
    if filter.level.is_some() {
        clause.push_str(" AND level = ?");
    }
    if filter.from.is_some() {
        clause.push_str(" AND timestamp >= ?");
    }
    if filter.to.is_some() {
        clause.push_str(" AND timestamp <= ?");
    }
    clause
}

fn row_to_event(row: sqlx::sqlite::SqliteRow) -> StoredEvent {
    let level: String = row.get("level");
    StoredEvent {
        id: row.get("id"),
        application: row.get("application"),
        environment: row.get("environment"),
        // Stored levels were validated on the way in
        level: level.parse().unwrap_or(LogLevel::Info),
        message: row.get("message"),
        timestamp: DateTime::from_timestamp_millis(row.get::<i64, _>("timestamp"))
            .unwrap_or_else(|| DateTime::<Utc>::MIN_UTC),
        trace_id: row.get("trace_id"),
        metadata: row.get("metadata"),
        sdk_language: row.get("sdk_language"),
        sdk_version: row.get("sdk_version"),
    }
}

/// Timestamps are stored at millisecond precision; the stored row reflects
/// that truncation.
fn truncate_to_millis(ts: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ts.timestamp_millis()).unwrap_or(ts)
}
