//! SQLite session store implementation.
//!
//! Implements `SessionStore` from `parley-core` using sqlx with split
//! read/write pools. Every write is a single statement with `RETURNING`, so
//! the caller receives exactly the row the statement produced.

use chrono::Utc;
use parley_core::repository::session::SessionStore;
use parley_types::JsonObject;
use parley_types::error::RepositoryError;
use parley_types::session::{CreateSessionRequest, Session, SessionStatus};
use sqlx::Row;
use tracing::debug;

use super::pool::DatabasePool;
use super::{datetime_to_micros, micros_to_datetime};

const SESSION_COLUMNS: &str = "session_id, status, language, started_at, ended_at, metadata";

/// SQLite-backed implementation of `SessionStore`.
pub struct SqliteSessionStore {
    pool: DatabasePool,
}

impl SqliteSessionStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain Session.
struct SessionRow {
    session_id: String,
    status: String,
    language: String,
    started_at: i64,
    ended_at: Option<i64>,
    metadata: String,
}

impl SessionRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            session_id: row.try_get("session_id")?,
            status: row.try_get("status")?,
            language: row.try_get("language")?,
            started_at: row.try_get("started_at")?,
            ended_at: row.try_get("ended_at")?,
            metadata: row.try_get("metadata")?,
        })
    }

    fn into_session(self) -> Result<Session, RepositoryError> {
        let status: SessionStatus = self
            .status
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let metadata: JsonObject = serde_json::from_str(&self.metadata)
            .map_err(|e| RepositoryError::Query(format!("invalid metadata JSON: {e}")))?;
        let started_at = micros_to_datetime(self.started_at)?;
        let ended_at = self.ended_at.map(micros_to_datetime).transpose()?;

        Ok(Session {
            session_id: self.session_id,
            status,
            language: self.language,
            started_at,
            ended_at,
            metadata,
        })
    }
}

fn map_session_row(row: &sqlx::sqlite::SqliteRow) -> Result<Session, RepositoryError> {
    SessionRow::from_row(row)
        .map_err(|e| RepositoryError::Query(e.to_string()))?
        .into_session()
}

impl SessionStore for SqliteSessionStore {
    async fn upsert(&self, request: &CreateSessionRequest) -> Result<Session, RepositoryError> {
        let metadata = serde_json::to_string(&request.metadata.clone().unwrap_or_default())
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let status = request.status.unwrap_or_default();

        // The no-op DO UPDATE makes RETURNING yield the stored row when the id
        // already exists, so creator and losers of a race read the same record
        // from this one statement.
        let sql = format!(
            "INSERT INTO sessions ({SESSION_COLUMNS})
             VALUES (?, ?, ?, ?, NULL, ?)
             ON CONFLICT (session_id) DO UPDATE SET session_id = sessions.session_id
             RETURNING {SESSION_COLUMNS}"
        );

        let row = sqlx::query(&sql)
            .bind(&request.session_id)
            .bind(status.to_string())
            .bind(&request.language)
            .bind(datetime_to_micros(&Utc::now()))
            .bind(&metadata)
            .fetch_one(&self.pool.writer)
            .await
            .map_err(|e| {
                RepositoryError::Query(format!("upsert session {}: {e}", request.session_id))
            })?;

        let session = map_session_row(&row)?;
        debug!(session_id = %session.session_id, "Session upsert committed");
        Ok(session)
    }

    async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>, RepositoryError> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE session_id = ?");
        let row = sqlx::query(&sql)
            .bind(session_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        row.as_ref().map(map_session_row).transpose()
    }

    async fn complete(&self, session_id: &str) -> Result<Session, RepositoryError> {
        let sql = format!(
            "UPDATE sessions SET status = ?, ended_at = ? WHERE session_id = ?
             RETURNING {SESSION_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(SessionStatus::Completed.to_string())
            .bind(datetime_to_micros(&Utc::now()))
            .bind(session_id)
            .fetch_optional(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(format!("complete session {session_id}: {e}")))?;

        match row {
            Some(row) => map_session_row(&row),
            None => Err(RepositoryError::NotFound(session_id.to_string())),
        }
    }

    async fn update_status(
        &self,
        session_id: &str,
        status: SessionStatus,
    ) -> Result<Session, RepositoryError> {
        let sql = format!(
            "UPDATE sessions SET status = ? WHERE session_id = ?
             RETURNING {SESSION_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(status.to_string())
            .bind(session_id)
            .fetch_optional(&self.pool.writer)
            .await
            .map_err(|e| {
                RepositoryError::Query(format!("update status of session {session_id}: {e}"))
            })?;

        match row {
            Some(row) => map_session_row(&row),
            None => Err(RepositoryError::NotFound(session_id.to_string())),
        }
    }
}
