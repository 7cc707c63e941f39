//! Session HTTP handlers.
//!
//! Endpoints:
//! - POST /sessions                 - Create a session (idempotent)
//! - GET  /sessions/{id}            - Get a session with a page of its events
//! - POST /sessions/{id}/complete   - Complete a session (idempotent)

use std::time::Instant;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use parley_types::page::SessionDetail;
use parley_types::session::{CreateSessionRequest, SessionView};

use crate::http::error::AppError;
use crate::http::extractors::query::PageQuery;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// POST /sessions - Create the session or return the existing one unchanged.
///
/// Always 200, whether or not the session already existed.
pub async fn upsert_session(
    State(state): State<AppState>,
    body: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<SessionView>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let Json(request) = body.map_err(|e| AppError::Validation(e.body_text()))?;
    if request.session_id.trim().is_empty() {
        return Err(AppError::Validation("sessionId must not be empty".to_string()));
    }
    if request.language.trim().is_empty() {
        return Err(AppError::Validation("language must not be empty".to_string()));
    }

    let session = state.conversation.upsert_session(request).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let self_link = format!("/sessions/{}", session.session_id);
    Ok(Json(
        ApiResponse::success(session, request_id, elapsed).with_link("self", &self_link),
    ))
}

/// GET /sessions/{id}?page&limit - Session plus one page of events, newest first.
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<SessionDetail>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let Query(query) = query.map_err(|e| AppError::Validation(e.body_text()))?;
    let page = query.resolve(&state.config)?;

    let detail = state
        .conversation
        .get_session_with_events(&session_id, page)
        .await?;

    let has_next = u64::from(page.page) < detail.pagination.total_pages;
    let page_link = |n: u32| format!("/sessions/{session_id}?page={n}&limit={}", page.limit);

    let elapsed = start.elapsed().as_millis() as u64;
    let mut response = ApiResponse::success(detail, request_id, elapsed)
        .with_link("self", &page_link(page.page))
        .with_link("add_event", &format!("/sessions/{session_id}/events"));
    if has_next {
        response = response.with_link("next", &page_link(page.page + 1));
    }

    Ok(Json(response))
}

/// POST /sessions/{id}/complete - Mark a session completed.
///
/// Completing an already completed session returns it unchanged.
pub async fn complete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<SessionView>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let session = state.conversation.complete_session(&session_id).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(
        ApiResponse::success(session, request_id, elapsed)
            .with_link("self", &format!("/sessions/{session_id}")),
    ))
}
