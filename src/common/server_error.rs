use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use crate::game::error::GameError;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid game state: {0}")]
    State(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Access denied")]
    AccessDenied,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Validation(_) | ServerError::State(_) => StatusCode::BAD_REQUEST,
            ServerError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServerError::AccessDenied => StatusCode::FORBIDDEN,
            ServerError::Sqlx(_) | ServerError::Migrate(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<GameError> for ServerError {
    fn from(e: GameError) -> Self {
        match e {
            GameError::PackNotFound(_)
            | GameError::QuestionNotFound(_)
            | GameError::SessionNotFound(_)
            | GameError::NoActiveSession(_)
            | GameError::NoPlayablePack
            | GameError::UserNotFound(_) => ServerError::NotFound(e.to_string()),
            GameError::EmptyPack(_)
            | GameError::PackTooLarge(_)
            | GameError::InvalidAnswer(_) => {
                ServerError::Validation(e.to_string())
            }
            GameError::StaleQuestion { .. }
            | GameError::AlreadyAnswered(_)
            | GameError::SessionCompleted(_) => ServerError::State(e.to_string()),
            GameError::Database(e) => ServerError::Sqlx(e),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            ServerError::Sqlx(_) | ServerError::Migrate(_) | ServerError::Internal(_) => {
                error!("{}", self);
                "Internal server error".to_string()
            }
            ServerError::AccessDenied => "Access denied".to_string(),
            ServerError::NotFound(msg)
            | ServerError::Validation(msg)
            | ServerError::State(msg)
            | ServerError::Unauthorized(msg) => msg.clone(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
