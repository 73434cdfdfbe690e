use std::sync::Arc;

use axum::{
    Extension, Json, Router, extract::State, http::StatusCode, response::IntoResponse,
    routing::get,
};

use crate::{
    auth::models::SubjectId,
    common::{app_state::AppState, server_error::ServerError},
    game::error::GameError,
    rating::{db, models::RatingResponse},
};

pub fn rating_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/user/rating", get(get_user_rating))
        .route("/user/rating-history", get(get_user_rating_history))
        .with_state(state)
}

async fn get_user_rating(
    State(state): State<Arc<AppState>>,
    Extension(subject_id): Extension<SubjectId>,
) -> Result<impl IntoResponse, ServerError> {
    let SubjectId::Registered(user_id) = subject_id else {
        return Err(ServerError::AccessDenied);
    };

    let rating = db::get_rating(state.get_pool(), user_id)
        .await?
        .ok_or(GameError::UserNotFound(user_id))?;

    Ok((StatusCode::OK, Json(RatingResponse { user_id, rating })))
}

async fn get_user_rating_history(
    State(state): State<Arc<AppState>>,
    Extension(subject_id): Extension<SubjectId>,
) -> Result<impl IntoResponse, ServerError> {
    let SubjectId::Registered(user_id) = subject_id else {
        return Err(ServerError::AccessDenied);
    };

    let history = db::get_rating_history(state.get_pool(), user_id).await?;
    Ok((StatusCode::OK, Json(history)))
}
