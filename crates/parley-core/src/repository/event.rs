//! Event store trait definition.

use parley_types::error::RepositoryError;
use parley_types::event::{CreateEventRequest, Event};
use parley_types::page::PageRequest;

/// Store trait for append-only event persistence.
///
/// Implementations live in parley-infra (e.g., `SqliteEventStore`).
pub trait EventStore: Send + Sync {
    /// Insert the event keyed on (`session_id`, `event_id`), or return the
    /// already stored event for that key.
    ///
    /// A duplicate key is not an error: the existing event is returned and
    /// the new type, payload and timestamp are discarded. Does not check that
    /// the session exists.
    fn add(
        &self,
        session_id: &str,
        request: &CreateEventRequest,
    ) -> impl std::future::Future<Output = Result<Event, RepositoryError>> + Send;

    /// One page of a session's events, newest first, plus the total count.
    ///
    /// Events sharing a timestamp are ordered by reverse insertion so that
    /// consecutive pages never overlap or skip.
    fn list_by_session(
        &self,
        session_id: &str,
        page: PageRequest,
    ) -> impl std::future::Future<Output = Result<(Vec<Event>, u64), RepositoryError>> + Send;

    /// Number of events recorded for a session.
    fn count_by_session(
        &self,
        session_id: &str,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Whether an event with this key has been recorded.
    fn exists(
        &self,
        session_id: &str,
        event_id: &str,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;
}
