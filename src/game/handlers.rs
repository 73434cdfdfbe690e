use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    auth::models::SubjectId,
    common::{app_state::AppState, extractors::AppJson, server_error::ServerError},
    game::{
        engine,
        error::GameError,
        models::{SessionQuery, SubmitAnswerRequest},
    },
    pack::models::PackSelector,
    system_log::models::{LogAction, LogCeverity},
};

pub fn game_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/game/{pack_id}/start", get(start_game).post(start_game))
        .route("/game/{pack_id}/current", get(current_question))
        .route("/game/{pack_id}/results", get(game_results))
        .route("/game/{pack_id}/results/{session_id}", get(session_results))
        .route("/game/{pack_id}/{question_id}/submit", post(submit_answer))
        .route("/game/{pack_id}/{question_id}/next", get(next_question))
        .with_state(state)
}

fn registered_user(subject_id: SubjectId) -> Result<Uuid, ServerError> {
    match subject_id {
        SubjectId::Registered(user_id) => Ok(user_id),
        SubjectId::System => Err(ServerError::AccessDenied),
    }
}

/// Persistence failures are kept in the system log; client errors are not.
fn audit_failure(state: &AppState, subject_id: SubjectId, function: &str, error: &GameError) {
    let GameError::Database(_) = error else {
        return;
    };

    state
        .syslog()
        .subject(subject_id)
        .action(LogAction::Other)
        .ceverity(LogCeverity::Critical)
        .function(function)
        .description(&error.to_string())
        .log_async();
}

async fn start_game(
    State(state): State<Arc<AppState>>,
    Extension(subject_id): Extension<SubjectId>,
    Path(pack_id): Path<i64>,
) -> Result<impl IntoResponse, ServerError> {
    let user_id = registered_user(subject_id)?;

    let response = engine::start_session(state.get_pool(), user_id, PackSelector::from(pack_id))
        .await
        .inspect_err(|e| audit_failure(&state, subject_id, "start_game", e))?;

    Ok((StatusCode::OK, Json(response)))
}

async fn submit_answer(
    State(state): State<Arc<AppState>>,
    Extension(subject_id): Extension<SubjectId>,
    Path((pack_id, question_id)): Path<(i64, i64)>,
    AppJson(request): AppJson<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let user_id = registered_user(subject_id)?;

    let response = match engine::submit_answer(
        state.get_pool(),
        user_id,
        pack_id,
        question_id,
        &request,
    )
    .await
    {
        Ok(response) => response,
        Err(e) => {
            if let GameError::AlreadyAnswered(index) = &e {
                state
                    .syslog()
                    .subject(subject_id)
                    .action(LogAction::Create)
                    .ceverity(LogCeverity::Warning)
                    .function("submit_answer")
                    .description("Rejected duplicate answer submission")
                    .metadata(json!({
                        "pack_id": pack_id,
                        "question_id": question_id,
                        "question_index": index,
                        "session_id": request.session_id,
                    }))
                    .log_async();
            } else {
                audit_failure(&state, subject_id, "submit_answer", &e);
            }
            return Err(e.into());
        }
    };

    Ok((StatusCode::OK, Json(response)))
}

async fn next_question(
    State(state): State<Arc<AppState>>,
    Extension(subject_id): Extension<SubjectId>,
    Path((pack_id, question_id)): Path<(i64, i64)>,
    Query(query): Query<SessionQuery>,
) -> Result<impl IntoResponse, ServerError> {
    let user_id = registered_user(subject_id)?;

    let response = engine::advance(
        state.get_pool(),
        user_id,
        pack_id,
        question_id,
        query.session_id,
    )
    .await
    .inspect_err(|e| audit_failure(&state, subject_id, "next_question", e))?;

    Ok((StatusCode::OK, Json(response)))
}

async fn current_question(
    State(state): State<Arc<AppState>>,
    Extension(subject_id): Extension<SubjectId>,
    Path(pack_id): Path<i64>,
    Query(query): Query<SessionQuery>,
) -> Result<impl IntoResponse, ServerError> {
    let user_id = registered_user(subject_id)?;

    let response =
        engine::get_current_question(state.get_pool(), user_id, pack_id, query.session_id)
            .await
            .inspect_err(|e| audit_failure(&state, subject_id, "current_question", e))?;

    Ok((StatusCode::OK, Json(response)))
}

async fn game_results(
    State(state): State<Arc<AppState>>,
    Extension(subject_id): Extension<SubjectId>,
    Path(pack_id): Path<i64>,
) -> Result<impl IntoResponse, ServerError> {
    let user_id = registered_user(subject_id)?;

    let response = engine::get_results(state.get_pool(), user_id, pack_id, None)
        .await
        .inspect_err(|e| audit_failure(&state, subject_id, "game_results", e))?;

    Ok((StatusCode::OK, Json(response)))
}

async fn session_results(
    State(state): State<Arc<AppState>>,
    Extension(subject_id): Extension<SubjectId>,
    Path((pack_id, session_id)): Path<(i64, Uuid)>,
) -> Result<impl IntoResponse, ServerError> {
    let user_id = registered_user(subject_id)?;

    let response = engine::get_results(state.get_pool(), user_id, pack_id, Some(session_id))
        .await
        .inspect_err(|e| audit_failure(&state, subject_id, "session_results", e))?;

    Ok((StatusCode::OK, Json(response)))
}
