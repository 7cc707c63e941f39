//! Conversation service coordinating sessions and their event timelines.
//!
//! The two stores know nothing about each other. This service is the only
//! place that holds both, so it owns the rule that an event may only be
//! recorded for an existing session, the idempotent completion check, and the
//! assembly of the session-with-events response.
//!
//! There is no transaction spanning a session and its events. `add_event`
//! checks for the session and then inserts; a session created between the two
//! steps simply means the caller saw `NotFound`, never a dangling event.

use parley_types::error::SessionError;
use parley_types::event::{CreateEventRequest, EventView, TimelineEntry};
use parley_types::page::{PageRequest, Pagination, SessionDetail};
use parley_types::session::{CreateSessionRequest, Session, SessionStatus, SessionView};
use tracing::{debug, info, warn};

use crate::repository::event::EventStore;
use crate::repository::session::SessionStore;

/// Orchestrates session lifecycle and event recording.
///
/// Generic over `SessionStore` and `EventStore` to maintain clean
/// architecture (parley-core never depends on parley-infra).
pub struct ConversationService<S: SessionStore, E: EventStore> {
    sessions: S,
    events: E,
}

impl<S: SessionStore, E: EventStore> ConversationService<S, E> {
    /// Create a new conversation service over the given stores.
    pub fn new(sessions: S, events: E) -> Self {
        Self { sessions, events }
    }

    /// Access the session store.
    pub fn sessions(&self) -> &S {
        &self.sessions
    }

    /// Access the event store.
    pub fn events(&self) -> &E {
        &self.events
    }

    /// Create the session, or return the existing one untouched.
    pub async fn upsert_session(
        &self,
        request: CreateSessionRequest,
    ) -> Result<SessionView, SessionError> {
        let session = self.sessions.upsert(&request).await?;
        debug!(session_id = %session.session_id, status = %session.status, "Session upserted");
        Ok(session.into())
    }

    /// Record an event on an existing session.
    ///
    /// Fails with `NotFound` (and records nothing) when the session does not
    /// exist. Re-sending an event id returns the originally stored event.
    pub async fn add_event(
        &self,
        session_id: &str,
        request: CreateEventRequest,
    ) -> Result<EventView, SessionError> {
        self.require_session(session_id).await?;

        let event = self.events.add(session_id, &request).await?;
        debug!(session_id, event_id = %event.event_id, "Event recorded");
        Ok(event.into())
    }

    /// Fetch a session together with one page of its events, newest first.
    pub async fn get_session_with_events(
        &self,
        session_id: &str,
        page: PageRequest,
    ) -> Result<SessionDetail, SessionError> {
        let session = self.require_session(session_id).await?;
        let (events, total) = self.events.list_by_session(session_id, page).await?;

        Ok(SessionDetail {
            session: session.into(),
            events: events.into_iter().map(TimelineEntry::from).collect(),
            pagination: Pagination::new(total, page),
        })
    }

    /// Complete a session.
    ///
    /// Idempotent: an already completed session is returned as stored, so its
    /// `ended_at` keeps the value from the first completion.
    pub async fn complete_session(&self, session_id: &str) -> Result<SessionView, SessionError> {
        let session = self.require_session(session_id).await?;
        if session.status == SessionStatus::Completed {
            debug!(session_id, "Session already completed");
            return Ok(session.into());
        }

        let session = self.sessions.complete(session_id).await?;
        info!(session_id, "Session completed");
        Ok(session.into())
    }

    /// Set a session's status. Any transition is accepted.
    pub async fn update_session_status(
        &self,
        session_id: &str,
        status: SessionStatus,
    ) -> Result<SessionView, SessionError> {
        let current = self.require_session(session_id).await?;
        if current.status.is_terminal() && current.status != status {
            warn!(
                session_id,
                from = %current.status,
                to = %status,
                "Moving session out of a terminal status"
            );
        }

        let session = self.sessions.update_status(session_id, status).await?;
        info!(session_id, status = %session.status, "Session status updated");
        Ok(session.into())
    }

    async fn require_session(&self, session_id: &str) -> Result<Session, SessionError> {
        self.sessions
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))
    }
}
