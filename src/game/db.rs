use chrono::{DateTime, Utc};
use sqlx::postgres::PgExecutor;
use uuid::Uuid;

use crate::game::models::{GameAnswer, GameSession};

const SESSION_COLUMNS: &str = "id, user_id, pack_id, current_question_index, questions_count, \
     is_completed, correct_answers, created_at, updated_at, completed_at";

#[derive(Debug, Clone, Copy)]
pub enum SessionLookup {
    ById(Uuid),
    LatestActive,
    Latest,
}

/// Finds a session owned by `user_id` in `pack_id`. With `for_update` the row
/// stays locked until the surrounding transaction ends.
pub async fn find_session<'e, E>(
    executor: E,
    user_id: Uuid,
    pack_id: i64,
    lookup: SessionLookup,
    for_update: bool,
) -> Result<Option<GameSession>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let filter = match lookup {
        SessionLookup::ById(_) => "AND id = $3",
        SessionLookup::LatestActive => "AND is_completed = FALSE",
        SessionLookup::Latest => "",
    };
    let lock = if for_update { "FOR UPDATE" } else { "" };

    let sql = format!(
        r#"
        SELECT {SESSION_COLUMNS}
        FROM "game_session"
        WHERE user_id = $1 AND pack_id = $2 {filter}
        ORDER BY created_at DESC
        LIMIT 1
        {lock}
        "#
    );

    let mut query = sqlx::query_as::<_, GameSession>(&sql)
        .bind(user_id)
        .bind(pack_id);

    if let SessionLookup::ById(session_id) = lookup {
        query = query.bind(session_id);
    }

    query.fetch_optional(executor).await
}

pub async fn tx_insert_session<'e, E>(executor: E, session: &GameSession) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO "game_session" (id, user_id, pack_id, current_question_index, questions_count,
            is_completed, correct_answers, created_at, updated_at, completed_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(session.id)
    .bind(session.user_id)
    .bind(session.pack_id)
    .bind(session.current_question_index)
    .bind(session.questions_count)
    .bind(session.is_completed)
    .bind(session.correct_answers)
    .bind(session.created_at)
    .bind(session.updated_at)
    .bind(session.completed_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Stores the question order of a session; position follows the slice order.
pub async fn tx_insert_snapshot<'e, E>(
    executor: E,
    session_id: Uuid,
    question_ids: &[i64],
) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query(
        r#"
        INSERT INTO "game_session_question" (session_id, position, question_id)
        SELECT $1, (t.pos - 1)::INTEGER, t.question_id
        FROM UNNEST($2::BIGINT[]) WITH ORDINALITY AS t(question_id, pos)
        "#,
    )
    .bind(session_id)
    .bind(question_ids)
    .execute(executor)
    .await?;

    Ok(row.rows_affected())
}

pub async fn get_snapshot_question_ids<'e, E>(
    executor: E,
    session_id: Uuid,
) -> Result<Vec<i64>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT question_id
        FROM "game_session_question"
        WHERE session_id = $1
        ORDER BY position ASC
        "#,
    )
    .bind(session_id)
    .fetch_all(executor)
    .await
}

pub async fn tx_update_session<'e, E>(
    executor: E,
    session: &GameSession,
) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query(
        r#"
        UPDATE "game_session"
        SET current_question_index = $1,
            is_completed = $2,
            correct_answers = $3,
            updated_at = $4,
            completed_at = $5
        WHERE id = $6
        "#,
    )
    .bind(session.current_question_index)
    .bind(session.is_completed)
    .bind(session.correct_answers)
    .bind(session.updated_at)
    .bind(session.completed_at)
    .bind(session.id)
    .execute(executor)
    .await?;

    Ok(row.rows_affected())
}

pub async fn answer_exists<'e, E>(
    executor: E,
    session_id: Uuid,
    question_index: i32,
) -> Result<bool, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM "game_answer"
            WHERE session_id = $1 AND question_index = $2
        )
        "#,
    )
    .bind(session_id)
    .bind(question_index)
    .fetch_one(executor)
    .await
}

pub async fn tx_insert_answer<'e, E>(executor: E, answer: &GameAnswer) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO "game_answer" (session_id, question_index, question_id, submitted_answer,
            is_correct, rating_change, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(answer.session_id)
    .bind(answer.question_index)
    .bind(answer.question_id)
    .bind(&answer.submitted_answer)
    .bind(answer.is_correct)
    .bind(answer.rating_change)
    .bind(answer.created_at)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn get_session_answers<'e, E>(
    executor: E,
    session_id: Uuid,
) -> Result<Vec<GameAnswer>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, GameAnswer>(
        r#"
        SELECT session_id, question_index, question_id, submitted_answer, is_correct,
            rating_change, created_at
        FROM "game_answer"
        WHERE session_id = $1
        ORDER BY question_index ASC
        "#,
    )
    .bind(session_id)
    .fetch_all(executor)
    .await
}

/// Closes every active session untouched since `cutoff`. Returns how many were closed.
pub async fn complete_stale_sessions<'e, E>(
    executor: E,
    cutoff: DateTime<Utc>,
) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let now = Utc::now();
    let row = sqlx::query(
        r#"
        UPDATE "game_session"
        SET is_completed = TRUE, completed_at = $1, updated_at = $1
        WHERE is_completed = FALSE AND updated_at < $2
        "#,
    )
    .bind(now)
    .bind(cutoff)
    .execute(executor)
    .await?;

    Ok(row.rows_affected())
}
