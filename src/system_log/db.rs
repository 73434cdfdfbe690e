use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    common::server_error::ServerError,
    system_log::models::{LogAction, LogCeverity, SubjectType},
};

#[allow(clippy::too_many_arguments)]
pub async fn create_system_log(
    pool: &Pool<Postgres>,
    subject_id: &str,
    subject_type: SubjectType,
    action: LogAction,
    ceverity: LogCeverity,
    function: &str,
    description: &str,
    metadata: &Option<serde_json::Value>,
) -> Result<(), ServerError> {
    let row = sqlx::query(
        r#"
        INSERT INTO "system_log" (subject_id, subject_type, action, ceverity, function,
            description, metadata, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(subject_id)
    .bind(subject_type)
    .bind(action)
    .bind(ceverity)
    .bind(function)
    .bind(description)
    .bind(metadata)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    if row.rows_affected() == 0 {
        return Err(ServerError::Internal("Failed to create system log".into()));
    }

    Ok(())
}
