//! Event HTTP handlers.
//!
//! Endpoints:
//! - POST /sessions/{id}/events - Record an event (idempotent on eventId)

use std::time::Instant;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use parley_types::event::{CreateEventRequest, EventView};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// POST /sessions/{id}/events - Record an event on an existing session.
///
/// Responds 201 for both a new event and a re-sent one; a re-send carries the
/// originally stored event.
pub async fn add_event(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    body: Result<Json<CreateEventRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<EventView>>), AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let Json(request) = body.map_err(|e| AppError::Validation(e.body_text()))?;
    if request.event_id.trim().is_empty() {
        return Err(AppError::Validation("eventId must not be empty".to_string()));
    }

    let event = state.conversation.add_event(&session_id, request).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let response = ApiResponse::success(event, request_id, elapsed)
        .with_link("session", &format!("/sessions/{session_id}"));
    Ok((StatusCode::CREATED, Json(response)))
}
