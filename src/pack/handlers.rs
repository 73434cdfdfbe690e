use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use crate::{
    common::{app_state::AppState, server_error::ServerError},
    game::error::GameError,
    pack::{db, models::PackQuestionsResponse},
};

/// Read-only content lookups, served without authentication.
pub fn pack_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/game/{pack_id}/questions", get(list_pack_questions))
        .route(
            "/game/{pack_id}/questions/{question_id}",
            get(get_pack_question),
        )
        .with_state(state)
}

async fn list_pack_questions(
    State(state): State<Arc<AppState>>,
    Path(pack_id): Path<i64>,
) -> Result<impl IntoResponse, ServerError> {
    let pool = state.get_pool();
    let Some(pack) = db::get_pack(pool, pack_id).await? else {
        return Err(GameError::PackNotFound(pack_id).into());
    };

    let questions = db::get_pack_questions(pool, pack_id).await?;
    let response = PackQuestionsResponse {
        id: pack.id,
        name: pack.name,
        description: pack.description,
        questions: questions.iter().map(|q| q.to_detail()).collect(),
    };

    Ok((StatusCode::OK, Json(response)))
}

async fn get_pack_question(
    State(state): State<Arc<AppState>>,
    Path((pack_id, question_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, ServerError> {
    let question = db::get_pack_question(state.get_pool(), pack_id, question_id)
        .await?
        .ok_or(GameError::QuestionNotFound(question_id))?;

    Ok((StatusCode::OK, Json(question.to_detail())))
}
