//! SQLite storage layer.
//!
//! Store implementations backed by SQLite with WAL mode and split
//! read/write connection pools.

pub mod event;
pub mod pool;
pub mod session;

use chrono::{DateTime, Utc};
use parley_types::error::RepositoryError;

/// Timestamps are stored as INTEGER microseconds since the Unix epoch, so
/// SQLite orders them numerically and every `DateTime<Utc>` round-trips.
pub(crate) fn datetime_to_micros(dt: &DateTime<Utc>) -> i64 {
    dt.timestamp_micros()
}

pub(crate) fn micros_to_datetime(micros: i64) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| RepositoryError::Query(format!("timestamp {micros} out of range")))
}
