use chrono::Utc;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sqlx::{PgConnection, Pool, Postgres, postgres::PgExecutor};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    game::{
        db::{self, SessionLookup},
        error::GameError,
        evaluator::{evaluate, validate_answer},
        models::{
            Advance, CurrentQuestionResponse, GameAnswer, GameSession, NextResponse,
            ResultsResponse, SessionSnapshot, StartSessionResponse, SubmitAnswerRequest,
            SubmitAnswerResponse,
        },
        results::compute_results,
    },
    pack::{
        db as pack_db,
        models::{PackSelector, PackSummary, Question, select_playable_pack},
    },
    rating::{
        db as rating_db,
        models::{DEFAULT_RATING, apply_rating_delta},
    },
};

pub async fn start_session(
    pool: &Pool<Postgres>,
    user_id: Uuid,
    selector: PackSelector,
) -> Result<StartSessionResponse, GameError> {
    let mut tx = pool.begin().await?;
    rating_db::ensure_user(&mut *tx, user_id).await?;

    let pack_id = match selector {
        PackSelector::Pack(pack_id) => {
            pack_db::get_pack(&mut *tx, pack_id)
                .await?
                .ok_or(GameError::PackNotFound(pack_id))?;
            pack_id
        }
        PackSelector::Random => {
            let candidates = pack_db::list_pack_candidates(&mut *tx).await?;
            let mut rng = ChaCha8Rng::from_os_rng();
            select_playable_pack(candidates, &mut rng).ok_or(GameError::NoPlayablePack)?
        }
    };

    let questions = pack_db::get_pack_questions(&mut *tx, pack_id).await?;
    let Some(first_question) = questions.first() else {
        return Err(GameError::EmptyPack(pack_id));
    };

    let question_ids: Vec<i64> = questions.iter().map(|q| q.id).collect();
    let session = GameSession::start(user_id, pack_id, question_ids.len())?;

    db::tx_insert_session(&mut *tx, &session).await?;
    db::tx_insert_snapshot(&mut *tx, session.id, &question_ids).await?;
    tx.commit().await?;

    info!(
        "Started session {} for user {} in pack {} ({} questions)",
        session.id, user_id, pack_id, session.questions_count
    );

    Ok(StartSessionResponse {
        real_pack_id: pack_id,
        first_question: first_question.to_view(),
        session: session.to_view(),
    })
}

/// Most recently started unfinished session of the user in this pack.
pub async fn get_active_session<'e, E>(
    executor: E,
    user_id: Uuid,
    pack_id: i64,
    for_update: bool,
) -> Result<GameSession, GameError>
where
    E: PgExecutor<'e>,
{
    db::find_session(
        executor,
        user_id,
        pack_id,
        SessionLookup::LatestActive,
        for_update,
    )
    .await?
    .ok_or(GameError::NoActiveSession(pack_id))
}

/// Explicit ids win over the latest-active fallback.
async fn resolve_session(
    conn: &mut PgConnection,
    user_id: Uuid,
    pack_id: i64,
    session_id: Option<Uuid>,
    for_update: bool,
) -> Result<GameSession, GameError> {
    match session_id {
        Some(session_id) => db::find_session(
            &mut *conn,
            user_id,
            pack_id,
            SessionLookup::ById(session_id),
            for_update,
        )
        .await?
        .ok_or(GameError::SessionNotFound(session_id)),
        None => get_active_session(&mut *conn, user_id, pack_id, for_update).await,
    }
}

async fn load_snapshot(
    conn: &mut PgConnection,
    session: GameSession,
) -> Result<SessionSnapshot, GameError> {
    let question_ids = db::get_snapshot_question_ids(&mut *conn, session.id).await?;
    Ok(SessionSnapshot::new(session, question_ids))
}

async fn load_question(conn: &mut PgConnection, question_id: i64) -> Result<Question, GameError> {
    pack_db::get_question(&mut *conn, question_id)
        .await?
        .ok_or(GameError::QuestionNotFound(question_id))
}

fn map_answer_insert_error(error: sqlx::Error, question_index: usize) -> GameError {
    match &error {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            GameError::AlreadyAnswered(question_index)
        }
        _ => GameError::Database(error),
    }
}

pub async fn submit_answer(
    pool: &Pool<Postgres>,
    user_id: Uuid,
    pack_id: i64,
    question_id: i64,
    request: &SubmitAnswerRequest,
) -> Result<SubmitAnswerResponse, GameError> {
    validate_answer(&request.answer)?;

    let mut tx = pool.begin().await?;
    let session = resolve_session(&mut tx, user_id, pack_id, request.session_id, true).await?;
    let mut snapshot = load_snapshot(&mut tx, session).await?;

    let index = snapshot.ensure_answerable(question_id)?;
    let question_index = snapshot.session.current_question_index;
    if db::answer_exists(&mut *tx, snapshot.session.id, question_index).await? {
        return Err(GameError::AlreadyAnswered(index));
    }

    let question = load_question(&mut tx, question_id).await?;
    let evaluation = evaluate(&question, &request.answer);

    let rating = rating_db::tx_lock_rating(&mut *tx, user_id)
        .await?
        .ok_or(GameError::UserNotFound(user_id))?;
    let update = apply_rating_delta(rating, evaluation.rating_delta);

    let now = Utc::now();
    snapshot.record_answer(evaluation.is_correct, now);

    let answer = GameAnswer {
        session_id: snapshot.session.id,
        question_index,
        question_id,
        submitted_answer: request.answer.clone(),
        is_correct: evaluation.is_correct,
        rating_change: update.applied_change,
        created_at: now,
    };
    db::tx_insert_answer(&mut *tx, &answer)
        .await
        .map_err(|e| map_answer_insert_error(e, index))?;
    db::tx_update_session(&mut *tx, &snapshot.session).await?;

    if update.applied_change != 0 {
        rating_db::tx_set_rating(&mut *tx, user_id, update.new).await?;
        rating_db::tx_append_rating_history(
            &mut *tx,
            user_id,
            update.new,
            update.applied_change,
            Some(snapshot.session.id),
        )
        .await?;
    }

    tx.commit().await?;

    debug!(
        "Session {} question {}: correct={} rating {} -> {}",
        snapshot.session.id, question_id, evaluation.is_correct, update.previous, update.new
    );

    Ok(SubmitAnswerResponse {
        is_correct: evaluation.is_correct,
        correct_answer: question.answer_text,
        current_score: snapshot.session.correct_answers,
        rating_change: update.applied_change,
        new_rating: update.new,
        session: snapshot.session.to_view(),
    })
}

pub async fn advance(
    pool: &Pool<Postgres>,
    user_id: Uuid,
    pack_id: i64,
    from_question_id: i64,
    session_id: Option<Uuid>,
) -> Result<NextResponse, GameError> {
    let mut tx = pool.begin().await?;

    let session = match resolve_session(&mut tx, user_id, pack_id, session_id, true).await {
        Ok(session) => session,
        // A retried final advance no longer has an active session to fall back on.
        Err(GameError::NoActiveSession(_)) => {
            let latest =
                db::find_session(&mut *tx, user_id, pack_id, SessionLookup::Latest, false).await?;
            match latest {
                Some(session) if session.is_completed => {
                    return Ok(NextResponse::Completed(session.completion()));
                }
                _ => return Err(GameError::NoActiveSession(pack_id)),
            }
        }
        Err(e) => return Err(e),
    };

    let mut snapshot = load_snapshot(&mut tx, session).await?;

    let response = match snapshot.advance(from_question_id, Utc::now())? {
        Advance::AlreadyCompleted => NextResponse::Completed(snapshot.session.completion()),
        Advance::Unchanged { question_id } => {
            let question = load_question(&mut tx, question_id).await?;
            NextResponse::Question {
                question: question.to_view(),
                session: snapshot.session.to_view(),
            }
        }
        Advance::Moved { question_id } => {
            let question = load_question(&mut tx, question_id).await?;
            db::tx_update_session(&mut *tx, &snapshot.session).await?;
            NextResponse::Question {
                question: question.to_view(),
                session: snapshot.session.to_view(),
            }
        }
        Advance::Completed => {
            db::tx_update_session(&mut *tx, &snapshot.session).await?;
            info!(
                "Session {} completed with {}/{} correct",
                snapshot.session.id,
                snapshot.session.correct_answers,
                snapshot.session.questions_count
            );
            NextResponse::Completed(snapshot.session.completion())
        }
    };

    tx.commit().await?;
    Ok(response)
}

pub async fn get_current_question(
    pool: &Pool<Postgres>,
    user_id: Uuid,
    pack_id: i64,
    session_id: Option<Uuid>,
) -> Result<CurrentQuestionResponse, GameError> {
    let mut conn = pool.acquire().await?;
    let session = resolve_session(&mut conn, user_id, pack_id, session_id, false).await?;
    let snapshot = load_snapshot(&mut conn, session).await?;

    let question = match snapshot.current_question_id() {
        Some(question_id) => pack_db::get_question(&mut *conn, question_id)
            .await?
            .map(|q| q.to_view()),
        None => None,
    };

    Ok(CurrentQuestionResponse {
        question,
        session: snapshot.session.to_view(),
    })
}

pub async fn get_results(
    pool: &Pool<Postgres>,
    user_id: Uuid,
    pack_id: i64,
    session_id: Option<Uuid>,
) -> Result<ResultsResponse, GameError> {
    let mut conn = pool.acquire().await?;

    let pack = pack_db::get_pack(&mut *conn, pack_id)
        .await?
        .ok_or(GameError::PackNotFound(pack_id))?;

    let session = match session_id {
        Some(session_id) => Some(
            db::find_session(
                &mut *conn,
                user_id,
                pack_id,
                SessionLookup::ById(session_id),
                false,
            )
            .await?
            .ok_or(GameError::SessionNotFound(session_id))?,
        ),
        None => db::find_session(&mut *conn, user_id, pack_id, SessionLookup::Latest, false).await?,
    };

    let answers = match &session {
        Some(session) if session.is_completed => {
            db::get_session_answers(&mut *conn, session.id).await?
        }
        _ => Vec::new(),
    };

    let current_rating = rating_db::get_rating(&mut *conn, user_id)
        .await?
        .unwrap_or(DEFAULT_RATING);

    Ok(compute_results(
        session.as_ref(),
        &answers,
        current_rating,
        PackSummary::from(&pack),
    ))
}

/// Marks active sessions idle for longer than `ttl_minutes` as completed.
pub async fn complete_stale_sessions(
    pool: &Pool<Postgres>,
    ttl_minutes: i64,
) -> Result<u64, GameError> {
    let cutoff = Utc::now() - chrono::Duration::minutes(ttl_minutes);
    Ok(db::complete_stale_sessions(pool, cutoff).await?)
}
