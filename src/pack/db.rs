use sqlx::postgres::PgExecutor;

use crate::pack::models::{Pack, PackCandidate, Question};

pub async fn get_pack<'e, E>(executor: E, pack_id: i64) -> Result<Option<Pack>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Pack>(
        r#"
        SELECT id, name, description, author_id, created_at
        FROM "pack"
        WHERE id = $1
        "#,
    )
    .bind(pack_id)
    .fetch_optional(executor)
    .await
}

pub async fn get_pack_questions<'e, E>(
    executor: E,
    pack_id: i64,
) -> Result<Vec<Question>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Question>(
        r#"
        SELECT q.id, q.question_text, q.answer_text, q.note, q.difficulty,
            q.image_url, q.author_id, q.created_at
        FROM "question" q
        JOIN "pack_question" pq ON pq.question_id = q.id
        WHERE pq.pack_id = $1
        ORDER BY q.id ASC
        "#,
    )
    .bind(pack_id)
    .fetch_all(executor)
    .await
}

pub async fn get_pack_question<'e, E>(
    executor: E,
    pack_id: i64,
    question_id: i64,
) -> Result<Option<Question>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Question>(
        r#"
        SELECT q.id, q.question_text, q.answer_text, q.note, q.difficulty,
            q.image_url, q.author_id, q.created_at
        FROM "question" q
        JOIN "pack_question" pq ON pq.question_id = q.id
        WHERE pq.pack_id = $1 AND q.id = $2
        "#,
    )
    .bind(pack_id)
    .bind(question_id)
    .fetch_optional(executor)
    .await
}

pub async fn get_question<'e, E>(
    executor: E,
    question_id: i64,
) -> Result<Option<Question>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question_text, answer_text, note, difficulty, image_url, author_id, created_at
        FROM "question"
        WHERE id = $1
        "#,
    )
    .bind(question_id)
    .fetch_optional(executor)
    .await
}

pub async fn list_pack_candidates<'e, E>(executor: E) -> Result<Vec<PackCandidate>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, PackCandidate>(
        r#"
        SELECT p.id, COUNT(pq.question_id) AS question_count
        FROM "pack" p
        LEFT JOIN "pack_question" pq ON pq.pack_id = p.id
        GROUP BY p.id
        "#,
    )
    .fetch_all(executor)
    .await
}
