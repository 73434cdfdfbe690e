use chrono::Utc;
use sqlx::postgres::PgExecutor;
use uuid::Uuid;

use crate::rating::models::{DEFAULT_RATING, RatingHistoryEntry};

/// Creates the rating row for a user seen for the first time. Returns true if a row was created.
pub async fn ensure_user<'e, E>(executor: E, user_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query(
        r#"
        INSERT INTO "app_user" (id, rating, created_at)
        VALUES ($1, $2, $3)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(DEFAULT_RATING)
    .bind(Utc::now())
    .execute(executor)
    .await?;

    Ok(row.rows_affected() != 0)
}

pub async fn get_rating<'e, E>(executor: E, user_id: Uuid) -> Result<Option<i32>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar::<_, i32>(r#"SELECT rating FROM "app_user" WHERE id = $1"#)
        .bind(user_id)
        .fetch_optional(executor)
        .await
}

/// Reads the rating and holds a row lock on the user until the transaction ends.
pub async fn tx_lock_rating<'e, E>(executor: E, user_id: Uuid) -> Result<Option<i32>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar::<_, i32>(r#"SELECT rating FROM "app_user" WHERE id = $1 FOR UPDATE"#)
        .bind(user_id)
        .fetch_optional(executor)
        .await
}

pub async fn tx_set_rating<'e, E>(
    executor: E,
    user_id: Uuid,
    rating: i32,
) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query(r#"UPDATE "app_user" SET rating = $1 WHERE id = $2"#)
        .bind(rating)
        .bind(user_id)
        .execute(executor)
        .await?;

    Ok(row.rows_affected())
}

pub async fn tx_append_rating_history<'e, E>(
    executor: E,
    user_id: Uuid,
    rating: i32,
    change: i32,
    session_id: Option<Uuid>,
) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO "rating_history" (user_id, rating, change, session_id, created_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(user_id)
    .bind(rating)
    .bind(change)
    .bind(session_id)
    .bind(Utc::now())
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn get_rating_history<'e, E>(
    executor: E,
    user_id: Uuid,
) -> Result<Vec<RatingHistoryEntry>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, RatingHistoryEntry>(
        r#"
        SELECT rating, change, session_id, created_at
        FROM "rating_history"
        WHERE user_id = $1
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
}
