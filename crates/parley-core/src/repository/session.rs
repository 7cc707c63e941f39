//! Session store trait definition.

use parley_types::error::RepositoryError;
use parley_types::session::{CreateSessionRequest, Session, SessionStatus};

/// Store trait for session persistence.
///
/// Implementations live in parley-infra (e.g., `SqliteSessionStore`).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait SessionStore: Send + Sync {
    /// Atomically create the session if absent, otherwise return the stored
    /// one unchanged.
    ///
    /// On creation: `status` defaults to `Initiated`, `metadata` to `{}`,
    /// `started_at` is now and `ended_at` is unset. On a repeat call the
    /// supplied language, status and metadata are discarded. Concurrent
    /// callers racing on the same id must all observe the single winner.
    fn upsert(
        &self,
        request: &CreateSessionRequest,
    ) -> impl std::future::Future<Output = Result<Session, RepositoryError>> + Send;

    /// Get a session by its business key.
    fn find_by_id(
        &self,
        session_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Session>, RepositoryError>> + Send;

    /// Mark the session completed and stamp `ended_at` with the current time.
    ///
    /// Unconditional: calling it twice re-stamps `ended_at`. Returns
    /// `RepositoryError::NotFound` if the session does not exist.
    fn complete(
        &self,
        session_id: &str,
    ) -> impl std::future::Future<Output = Result<Session, RepositoryError>> + Send;

    /// Overwrite the session status. No transition rules are applied.
    fn update_status(
        &self,
        session_id: &str,
        status: SessionStatus,
    ) -> impl std::future::Future<Output = Result<Session, RepositoryError>> + Send;
}
