//! SQLite event store implementation.
//!
//! Implements `EventStore` from `parley-core`. Inserts are find-or-create
//! over the unique index on (`session_id`, `event_id`): the insert either
//! produces a row or reports that the key is taken, and a taken key is
//! answered with the record already stored under it.

use chrono::{SubsecRound, Utc};
use parley_core::repository::event::EventStore;
use parley_types::JsonObject;
use parley_types::error::RepositoryError;
use parley_types::event::{CreateEventRequest, Event, EventType};
use parley_types::page::PageRequest;
use sqlx::Row;
use tracing::{error, warn};

use super::pool::DatabasePool;
use super::{datetime_to_micros, micros_to_datetime};

const EVENT_COLUMNS: &str = "session_id, event_id, type, payload, timestamp";

/// SQLite-backed implementation of `EventStore`.
pub struct SqliteEventStore {
    pool: DatabasePool,
}

impl SqliteEventStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Attempt the insert. A key that already exists yields `Duplicate`.
    async fn try_insert(
        &self,
        event: &Event,
        payload: &str,
    ) -> Result<InsertOutcome, RepositoryError> {
        let sql = format!(
            "INSERT INTO events ({EVENT_COLUMNS}) VALUES (?, ?, ?, ?, ?)
             ON CONFLICT (session_id, event_id) DO NOTHING
             RETURNING {EVENT_COLUMNS}"
        );

        let result = sqlx::query(&sql)
            .bind(&event.session_id)
            .bind(&event.event_id)
            .bind(event.event_type.to_string())
            .bind(payload)
            .bind(datetime_to_micros(&event.timestamp))
            .fetch_optional(&self.pool.writer)
            .await;

        match result {
            Ok(Some(row)) => Ok(InsertOutcome::Inserted(map_event_row(&row)?)),
            Ok(None) => Ok(InsertOutcome::Duplicate),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Ok(InsertOutcome::Duplicate)
            }
            Err(e) => Err(RepositoryError::Query(format!(
                "insert event {} for session {}: {e}",
                event.event_id, event.session_id
            ))),
        }
    }

    /// Fetch the record that won the key. Read from the writer so the
    /// committed row is visible.
    async fn fetch_existing(
        &self,
        session_id: &str,
        event_id: &str,
    ) -> Result<Option<Event>, RepositoryError> {
        let sql =
            format!("SELECT {EVENT_COLUMNS} FROM events WHERE session_id = ? AND event_id = ?");
        let row = sqlx::query(&sql)
            .bind(session_id)
            .bind(event_id)
            .fetch_optional(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        row.as_ref().map(map_event_row).transpose()
    }
}

/// Result of an insert attempt against the unique (session, event) key.
enum InsertOutcome {
    Inserted(Event),
    Duplicate,
}

/// Internal row type for mapping SQLite rows to domain Event.
struct EventRow {
    session_id: String,
    event_id: String,
    event_type: String,
    payload: String,
    timestamp: i64,
}

impl EventRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            session_id: row.try_get("session_id")?,
            event_id: row.try_get("event_id")?,
            event_type: row.try_get("type")?,
            payload: row.try_get("payload")?,
            timestamp: row.try_get("timestamp")?,
        })
    }

    fn into_event(self) -> Result<Event, RepositoryError> {
        let event_type: EventType = self
            .event_type
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let payload: JsonObject = serde_json::from_str(&self.payload)
            .map_err(|e| RepositoryError::Query(format!("invalid payload JSON: {e}")))?;

        Ok(Event {
            session_id: self.session_id,
            event_id: self.event_id,
            event_type,
            payload,
            timestamp: micros_to_datetime(self.timestamp)?,
        })
    }
}

fn map_event_row(row: &sqlx::sqlite::SqliteRow) -> Result<Event, RepositoryError> {
    EventRow::from_row(row)
        .map_err(|e| RepositoryError::Query(e.to_string()))?
        .into_event()
}

impl EventStore for SqliteEventStore {
    async fn add(
        &self,
        session_id: &str,
        request: &CreateEventRequest,
    ) -> Result<Event, RepositoryError> {
        // Stored precision is microseconds.
        let timestamp = request.timestamp.unwrap_or_else(Utc::now).trunc_subsecs(6);
        let event = Event {
            session_id: session_id.to_string(),
            event_id: request.event_id.clone(),
            event_type: request.event_type,
            payload: request.payload.clone(),
            timestamp,
        };
        let payload = serde_json::to_string(&event.payload)
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match self.try_insert(&event, &payload).await? {
            InsertOutcome::Inserted(stored) => Ok(stored),
            InsertOutcome::Duplicate => {
                warn!(
                    session_id,
                    event_id = %request.event_id,
                    "Duplicate event, returning stored record"
                );
                match self.fetch_existing(session_id, &request.event_id).await? {
                    Some(existing) => Ok(existing),
                    None => {
                        error!(
                            session_id,
                            event_id = %request.event_id,
                            "Event key conflicted but no stored record was found"
                        );
                        Err(RepositoryError::Query(format!(
                            "event {} for session {session_id} conflicted but could not be found",
                            request.event_id
                        )))
                    }
                }
            }
        }
    }

    async fn list_by_session(
        &self,
        session_id: &str,
        page: PageRequest,
    ) -> Result<(Vec<Event>, u64), RepositoryError> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE session_id = ?
             ORDER BY timestamp DESC, seq DESC
             LIMIT ? OFFSET ?"
        );
        let rows_query = sqlx::query(&sql)
            .bind(session_id)
            .bind(i64::from(page.limit))
            .bind(page.offset() as i64)
            .fetch_all(&self.pool.reader);

        let (rows, total) = tokio::try_join!(
            async { rows_query.await.map_err(|e| RepositoryError::Query(e.to_string())) },
            self.count_by_session(session_id),
        )?;

        let mut events = Vec::with_capacity(rows.len());
        for row in &rows {
            events.push(map_event_row(row)?);
        }

        Ok((events, total))
    }

    async fn count_by_session(&self, session_id: &str) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM events WHERE session_id = ?")
            .bind(session_id)
            .fetch_one(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let count: i64 = row
            .try_get("cnt")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(count as u64)
    }

    async fn exists(&self, session_id: &str, event_id: &str) -> Result<bool, RepositoryError> {
        let row = sqlx::query(
            "SELECT EXISTS(SELECT 1 FROM events WHERE session_id = ? AND event_id = ?) as found",
        )
        .bind(session_id)
        .bind(event_id)
        .fetch_one(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let found: i64 = row
            .try_get("found")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(found != 0)
    }
}
