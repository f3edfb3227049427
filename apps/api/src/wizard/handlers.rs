//! Axum route handlers for the wizard API.
//!
//! Handlers validate input, locate the session, and delegate to its
//! operations. Generation failures never surface here as raw errors —
//! the session converts them into its own error field first.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::assets::CompanionAssets;
use crate::models::form::FormAnswers;
use crate::state::AppState;

use super::session::SessionView;
use super::store::SharedSession;

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct EditTitleRequest {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct EditPointRequest {
    pub content: String,
}

async fn lookup(state: &AppState, id: Uuid) -> Result<SharedSession, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}

/// POST /api/v1/sessions
///
/// Validates the wizard answers and opens a new session.
pub async fn handle_create_session(
    State(state): State<AppState>,
    Json(answers): Json<FormAnswers>,
) -> Result<(StatusCode, Json<CreateSessionResponse>), AppError> {
    let violations = answers.validate();
    if !violations.is_empty() {
        return Err(AppError::Validation(violations.join("; ")));
    }

    let session_id = state.sessions.create(answers).await;
    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse { session_id }),
    ))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = lookup(&state, id).await?;
    let guard = session.lock().await;
    Ok(Json(SessionView::from(&*guard)))
}

/// POST /api/v1/sessions/:id/outline
///
/// Runs outline generation. The response is the session view either way;
/// a failure shows up in its `error` field, leaving retry, fallback, and
/// form revision open to the caller.
pub async fn handle_generate_outline(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = lookup(&state, id).await?;
    let mut guard = session.lock().await;
    guard
        .generate_outline(state.backend.as_ref(), &state.notifier)
        .await;
    Ok(Json(SessionView::from(&*guard)))
}

/// POST /api/v1/sessions/:id/outline/fallback
pub async fn handle_use_fallback(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = lookup(&state, id).await?;
    let mut guard = session.lock().await;
    guard.use_fallback_outline();
    Ok(Json(SessionView::from(&*guard)))
}

/// POST /api/v1/sessions/:id/assets
///
/// Generates slides, outreach email, and marketing plan for the accepted
/// outline. Assets are not stored — each call regenerates them.
pub async fn handle_generate_assets(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CompanionAssets>, AppError> {
    let session = lookup(&state, id).await?;
    let mut guard = session.lock().await;
    let assets = guard.generate_assets(state.backend.as_ref()).await?;
    Ok(Json(assets))
}

/// PATCH /api/v1/sessions/:id/chapters/:chapter_id
pub async fn handle_edit_chapter_title(
    State(state): State<AppState>,
    Path((id, chapter_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<EditTitleRequest>,
) -> Result<Json<SessionView>, AppError> {
    if request.title.trim().is_empty() {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }

    let session = lookup(&state, id).await?;
    let mut guard = session.lock().await;
    guard.edit_chapter_title(chapter_id, &request.title);
    Ok(Json(SessionView::from(&*guard)))
}

/// PATCH /api/v1/sessions/:id/chapters/:chapter_id/points/:point_id
pub async fn handle_edit_chapter_point(
    State(state): State<AppState>,
    Path((id, chapter_id, point_id)): Path<(Uuid, Uuid, Uuid)>,
    Json(request): Json<EditPointRequest>,
) -> Result<Json<SessionView>, AppError> {
    if request.content.trim().is_empty() {
        return Err(AppError::Validation("content cannot be empty".to_string()));
    }

    let session = lookup(&state, id).await?;
    let mut guard = session.lock().await;
    guard.edit_chapter_point(chapter_id, point_id, &request.content);
    Ok(Json(SessionView::from(&*guard)))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Session {id} not found")))
    }
}
