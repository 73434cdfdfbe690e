use std::{sync::Arc, time::Duration};

use serde_json::json;
use tracing::{debug, error, info};

use crate::{
    auth::models::SubjectId,
    common::app_state::AppState,
    game::engine::complete_stale_sessions,
    system_log::models::{LogAction, LogCeverity},
};

/// Periodically closes sessions that have been idle longer than `ttl_minutes`.
pub fn spawn_session_cleanup(state: Arc<AppState>, ttl_minutes: i64, interval_secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));

    tokio::spawn(async move {
        loop {
            interval.tick().await;
            debug!("Closing game sessions idle for more than {} minutes", ttl_minutes);

            let closed = match complete_stale_sessions(state.get_pool(), ttl_minutes).await {
                Ok(closed) => closed,
                Err(e) => {
                    error!("Failed to close stale sessions: {}", e);
                    state
                        .syslog()
                        .subject(SubjectId::System)
                        .action(LogAction::Update)
                        .ceverity(LogCeverity::Critical)
                        .function("spawn_session_cleanup")
                        .description("Failed to close stale game sessions")
                        .metadata(json!({"error": e.to_string()}))
                        .log_async();
                    continue;
                }
            };

            if closed > 0 {
                info!("Closed {} stale game sessions", closed);
                state
                    .syslog()
                    .subject(SubjectId::System)
                    .action(LogAction::Update)
                    .ceverity(LogCeverity::Info)
                    .function("spawn_session_cleanup")
                    .description(&format!("Closed {} stale game sessions", closed))
                    .metadata(json!({"ttl_minutes": ttl_minutes}))
                    .log_async();
            }
        }
    });
}
