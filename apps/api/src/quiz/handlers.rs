use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::history::StoredTest;
use crate::quiz::catalog::{InterviewDomain, DOMAINS};
use crate::quiz::session::{EnvironmentEvent, SessionError};
use crate::quiz::view::SessionResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    pub user_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct SelectDomainRequest {
    pub domain: String,
}

#[derive(Deserialize)]
pub struct SelectAnswerRequest {
    /// Signed so a negative index is a 400 rather than a body rejection.
    pub index: i64,
}

#[derive(Deserialize)]
pub struct EnvironmentEventRequest {
    pub event: EnvironmentEvent,
}

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

/// GET /api/v1/interview/domains
pub async fn handle_list_domains() -> Json<&'static [InterviewDomain]> {
    Json(DOMAINS)
}

/// POST /api/v1/interview/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
    body: Option<Json<CreateSessionRequest>>,
) -> (StatusCode, Json<SessionResponse>) {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let response = state.quiz.create_session(req.user_id).await;
    (StatusCode::CREATED, Json(response))
}

/// GET /api/v1/interview/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    Ok(Json(state.quiz.get(id).await?))
}

/// DELETE /api/v1/interview/sessions/:id
pub async fn handle_end_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.quiz.end_session(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/interview/sessions/:id/domain
pub async fn handle_select_domain(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SelectDomainRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    Ok(Json(state.quiz.select_domain(id, &req.domain).await?))
}

/// POST /api/v1/interview/sessions/:id/start
pub async fn handle_start_test(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    Ok(Json(state.quiz.start_test(id).await?))
}

/// POST /api/v1/interview/sessions/:id/answer
pub async fn handle_select_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SelectAnswerRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let index = usize::try_from(req.index).map_err(|_| SessionError::AnswerOutOfRange(req.index))?;
    Ok(Json(state.quiz.select_answer(id, index).await?))
}

/// POST /api/v1/interview/sessions/:id/answer/cancel
pub async fn handle_cancel_confirmation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    Ok(Json(state.quiz.cancel_confirmation(id).await?))
}

/// POST /api/v1/interview/sessions/:id/warning/ack
pub async fn handle_acknowledge_warning(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    Ok(Json(state.quiz.acknowledge_warning(id).await?))
}

/// POST /api/v1/interview/sessions/:id/confirm
pub async fn handle_confirm_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    Ok(Json(state.quiz.confirm_answer(id).await?))
}

/// POST /api/v1/interview/sessions/:id/next
pub async fn handle_next_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    Ok(Json(state.quiz.next_question(id).await?))
}

/// POST /api/v1/interview/sessions/:id/explanation
pub async fn handle_request_explanation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    Ok(Json(state.quiz.request_explanation(id).await?))
}

/// POST /api/v1/interview/sessions/:id/retry
pub async fn handle_retry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    Ok(Json(state.quiz.retry(id).await?))
}

/// POST /api/v1/interview/sessions/:id/events
pub async fn handle_environment_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<EnvironmentEventRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    Ok(Json(state.quiz.handle_event(id, req.event).await?))
}

/// GET /api/v1/interview/history?user_id=
pub async fn handle_history(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<StoredTest>>, AppError> {
    Ok(Json(state.quiz.history(params.user_id).await?))
}
