use std::sync::Arc;

use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get,
};
use serde_json::json;
use tracing::error;

use crate::{
    common::app_state::AppState,
    health::db,
    system_log::models::{LogAction, LogCeverity},
};

pub fn health_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/detailed", get(health_detailed))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    "OK".into_response()
}

async fn health_detailed(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let db_status = match db::health_check(state.get_pool()).await {
        Ok(_) => true,
        Err(e) => {
            error!("Failed database health check: {}", e);
            state
                .syslog()
                .action(LogAction::Read)
                .ceverity(LogCeverity::Critical)
                .function("health_detailed")
                .description("Database health check failed")
                .log_async();

            false
        }
    };

    let status = if db_status {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let json = json!({
        "platform": true,
        "database": db_status,
    });

    (status, Json(json))
}
