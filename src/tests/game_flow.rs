/// These run against the Postgres at `CHGK__DATABASE__URL`:
/// `cargo test -- --ignored`.
#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use dotenv::dotenv;
    use futures::future::join_all;
    use sqlx::{Executor, Pool, Postgres, postgres::PgPoolOptions};
    use tracing::{debug, level_filters::LevelFilter};
    use uuid::Uuid;

    use crate::{
        common::app_state::AppState,
        config::config::CONFIG,
        game::{
            engine,
            error::GameError,
            models::{NextResponse, SubmitAnswerRequest},
        },
        pack::models::PackSelector,
        rating::db as rating_db,
    };

    fn setup_logging() {
        let _ = tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(LevelFilter::DEBUG)
            .with_test_writer()
            .try_init();
    }

    async fn setup_app_state() -> Arc<AppState> {
        dotenv().ok();
        setup_logging();
        AppState::from_connection_string(&CONFIG.database.url)
            .await
            .unwrap()
    }

    /// State on a fresh schema of its own, for tests that need to control
    /// every pack in the database.
    async fn setup_isolated_app_state() -> Arc<AppState> {
        dotenv().ok();
        setup_logging();
        let schema = format!("chgk_test_{}", Uuid::new_v4().simple());

        let admin = PgPoolOptions::new()
            .max_connections(1)
            .connect(&CONFIG.database.url)
            .await
            .unwrap();
        admin
            .execute(format!("CREATE SCHEMA {}", schema).as_str())
            .await
            .unwrap();

        let search_path = format!("SET search_path TO {}", schema);
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .after_connect(move |conn, _meta| {
                let search_path = search_path.clone();
                Box::pin(async move {
                    conn.execute(search_path.as_str()).await?;
                    Ok(())
                })
            })
            .connect(&CONFIG.database.url)
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();

        AppState::from_pool(pool)
    }

    /// Creates a pack holding one question per `(answer, difficulty)` and
    /// returns the pack id with question ids in play order.
    async fn seed_pack(pool: &Pool<Postgres>, questions: &[(&str, i16)]) -> (i64, Vec<i64>) {
        let pack_id: i64 =
            sqlx::query_scalar(r#"INSERT INTO "pack" (name) VALUES ($1) RETURNING id"#)
                .bind(format!("pack-{}", Uuid::new_v4()))
                .fetch_one(pool)
                .await
                .unwrap();

        let mut question_ids = Vec::new();
        for (answer, difficulty) in questions {
            let question_id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO "question" (question_text, answer_text, difficulty)
                VALUES ($1, $2, $3)
                RETURNING id
                "#,
            )
            .bind(format!("What is {}?", answer))
            .bind(*answer)
            .bind(*difficulty)
            .fetch_one(pool)
            .await
            .unwrap();

            sqlx::query(r#"INSERT INTO "pack_question" (pack_id, question_id) VALUES ($1, $2)"#)
                .bind(pack_id)
                .bind(question_id)
                .execute(pool)
                .await
                .unwrap();

            question_ids.push(question_id);
        }

        (pack_id, question_ids)
    }

    fn answer(text: &str, session_id: Option<Uuid>) -> SubmitAnswerRequest {
        SubmitAnswerRequest {
            answer: text.to_string(),
            session_id,
        }
    }

    #[tokio::test]
    #[ignore]
    async fn two_question_game_updates_score_and_rating() {
        let state = setup_app_state().await;
        let pool = state.get_pool();
        let user_id = Uuid::new_v4();
        let (pack_id, ids) = seed_pack(pool, &[("cat", 2), ("dog", 5)]).await;

        let start = engine::start_session(pool, user_id, PackSelector::Pack(pack_id))
            .await
            .unwrap();
        assert_eq!(start.real_pack_id, pack_id);
        assert_eq!(start.first_question.id, ids[0]);
        assert_eq!(start.session.questions_count, 2);
        let session_id = Some(start.session.id);

        let first = engine::submit_answer(
            pool,
            user_id,
            pack_id,
            ids[0],
            &answer("CAT ", session_id),
        )
            .await
            .unwrap();
        assert!(first.is_correct);
        assert_eq!(first.new_rating, 1020);
        assert_eq!(first.current_score, 1);
        assert_eq!(first.correct_answer, "cat");

        let next = engine::advance(pool, user_id, pack_id, ids[0], session_id)
            .await
            .unwrap();
        let NextResponse::Question { question, .. } = next else {
            panic!("expected second question");
        };
        assert_eq!(question.id, ids[1]);

        let second = engine::submit_answer(
            pool,
            user_id,
            pack_id,
            ids[1],
            &answer("fish", session_id),
        )
            .await
            .unwrap();
        assert!(!second.is_correct);
        assert_eq!(second.new_rating, 970);
        assert_eq!(second.rating_change, -50);

        let done = engine::advance(pool, user_id, pack_id, ids[1], session_id)
            .await
            .unwrap();
        let NextResponse::Completed(completion) = done else {
            panic!("expected completion");
        };
        assert_eq!(completion.final_score, 1);
        assert_eq!(completion.total_questions, 2);

        let again = engine::advance(pool, user_id, pack_id, ids[1], None)
            .await
            .unwrap();
        assert!(matches!(again, NextResponse::Completed(c) if c == completion));

        let results = engine::get_results(pool, user_id, pack_id, None)
            .await
            .unwrap();
        assert_eq!(results.correct_answers, 1);
        assert_eq!(results.total_questions, 2);
        assert_eq!(results.previous_rating, 1000);
        assert_eq!(results.current_rating, 970);
        assert_eq!(results.rating_change, -30);

        let history = rating_db::get_rating_history(pool, user_id).await.unwrap();
        assert_eq!(history.len(), 2);
        debug!("Rating history: {:?}", history);
    }

    #[tokio::test]
    #[ignore]
    async fn stale_and_duplicate_submissions_change_nothing() {
        let state = setup_app_state().await;
        let pool = state.get_pool();
        let user_id = Uuid::new_v4();
        let (pack_id, ids) = seed_pack(pool, &[("one", 1), ("two", 1)]).await;

        let start = engine::start_session(pool, user_id, PackSelector::Pack(pack_id))
            .await
            .unwrap();
        let session_id = Some(start.session.id);

        let stale =
            engine::submit_answer(pool, user_id, pack_id, ids[1], &answer("two", session_id)).await;
        assert!(matches!(stale, Err(GameError::StaleQuestion { .. })));

        engine::submit_answer(pool, user_id, pack_id, ids[0], &answer("one", session_id))
            .await
            .unwrap();
        let duplicate =
            engine::submit_answer(pool, user_id, pack_id, ids[0], &answer("one", session_id)).await;
        assert!(matches!(duplicate, Err(GameError::AlreadyAnswered(0))));

        let rating = rating_db::get_rating(pool, user_id).await.unwrap();
        assert_eq!(rating, Some(1010));

        let current = engine::get_current_question(pool, user_id, pack_id, session_id)
            .await
            .unwrap();
        assert_eq!(current.question.map(|q| q.id), Some(ids[0]));
        assert_eq!(current.session.current_question_index, 0);
    }

    #[tokio::test]
    #[ignore]
    async fn concurrent_submissions_apply_once() {
        let state = setup_app_state().await;
        let pool = state.get_pool();
        let user_id = Uuid::new_v4();
        let (pack_id, ids) = seed_pack(pool, &[("race", 3)]).await;

        let start = engine::start_session(pool, user_id, PackSelector::Pack(pack_id))
            .await
            .unwrap();
        let request = answer("race", Some(start.session.id));

        let outcomes = join_all(
            (0..8).map(|_| engine::submit_answer(pool, user_id, pack_id, ids[0], &request)),
        )
        .await;

        let accepted = outcomes.iter().filter(|o| o.is_ok()).count();
        let rejected = outcomes
            .iter()
            .filter(|o| matches!(o, Err(GameError::AlreadyAnswered(_))))
            .count();
        assert_eq!(accepted, 1);
        assert_eq!(rejected, 7);

        let rating = rating_db::get_rating(pool, user_id).await.unwrap();
        assert_eq!(rating, Some(1030));
    }

    #[tokio::test]
    #[ignore]
    async fn missing_and_empty_packs_are_rejected() {
        let state = setup_app_state().await;
        let pool = state.get_pool();
        let user_id = Uuid::new_v4();
        let (empty_pack, _) = seed_pack(pool, &[]).await;

        let missing = engine::start_session(pool, user_id, PackSelector::Pack(i64::MAX)).await;
        assert!(matches!(missing, Err(GameError::PackNotFound(_))));

        let empty = engine::start_session(pool, user_id, PackSelector::Pack(empty_pack)).await;
        assert!(matches!(empty, Err(GameError::EmptyPack(id)) if id == empty_pack));

        let no_session = engine::get_active_session(pool, user_id, empty_pack, false).await;
        assert!(matches!(no_session, Err(GameError::NoActiveSession(_))));
    }

    #[tokio::test]
    #[ignore]
    async fn random_pack_never_picks_an_empty_pack() {
        let state = setup_app_state().await;
        let pool = state.get_pool();
        let user_id = Uuid::new_v4();
        seed_pack(pool, &[]).await;
        seed_pack(pool, &[("random", 1)]).await;

        for _ in 0..5 {
            let start = engine::start_session(pool, user_id, PackSelector::Random)
                .await
                .unwrap();
            assert!(start.session.questions_count > 0);
        }
    }

    #[tokio::test]
    #[ignore]
    async fn idle_sessions_are_closed() {
        let state = setup_app_state().await;
        let pool = state.get_pool();
        let user_id = Uuid::new_v4();
        let (pack_id, _) = seed_pack(pool, &[("idle", 1)]).await;

        let start = engine::start_session(pool, user_id, PackSelector::Pack(pack_id))
            .await
            .unwrap();
        sqlx::query(
            r#"UPDATE "game_session" SET updated_at = NOW() - INTERVAL '2 hours' WHERE id = $1"#,
        )
        .bind(start.session.id)
        .execute(pool)
        .await
        .unwrap();

        let closed = engine::complete_stale_sessions(pool, 60).await.unwrap();
        assert!(closed >= 1);

        let active = engine::get_active_session(pool, user_id, pack_id, false).await;
        assert!(matches!(active, Err(GameError::NoActiveSession(_))));
    }

    #[tokio::test]
    #[ignore]
    async fn random_start_with_only_empty_packs_finds_nothing() {
        let state = setup_isolated_app_state().await;
        let pool = state.get_pool();
        let user_id = Uuid::new_v4();

        let no_packs = engine::start_session(pool, user_id, PackSelector::Random).await;
        assert!(matches!(no_packs, Err(GameError::NoPlayablePack)));

        seed_pack(pool, &[]).await;
        seed_pack(pool, &[]).await;
        seed_pack(pool, &[]).await;

        let only_empty = engine::start_session(pool, user_id, PackSelector::Random).await;
        assert!(matches!(only_empty, Err(GameError::NoPlayablePack)));

        let (pack_id, _) = seed_pack(pool, &[("late", 1)]).await;
        let start = engine::start_session(pool, user_id, PackSelector::Random)
            .await
            .unwrap();
        assert_eq!(start.real_pack_id, pack_id);
    }

    #[tokio::test]
    #[ignore]
    async fn wrong_answers_stop_at_the_rating_floor() {
        let state = setup_app_state().await;
        let pool = state.get_pool();
        let user_id = Uuid::new_v4();
        let questions: Vec<(&str, i16)> = (0..12).map(|_| ("right", 5)).collect();
        let (pack_id, ids) = seed_pack(pool, &questions).await;

        let start = engine::start_session(pool, user_id, PackSelector::Pack(pack_id))
            .await
            .unwrap();
        let session_id = Some(start.session.id);

        let mut applied = Vec::new();
        for question_id in &ids {
            let outcome = engine::submit_answer(
                pool,
                user_id,
                pack_id,
                *question_id,
                &answer("wrong", session_id),
            )
            .await
            .unwrap();
            assert!(outcome.new_rating >= 500);
            applied.push(outcome.rating_change);

            engine::advance(pool, user_id, pack_id, *question_id, session_id)
                .await
                .unwrap();
        }

        assert_eq!(applied.iter().sum::<i32>(), -500);
        assert_eq!(applied.last(), Some(&0));

        let rating = rating_db::get_rating(pool, user_id).await.unwrap();
        assert_eq!(rating, Some(500));

        let results = engine::get_results(pool, user_id, pack_id, session_id)
            .await
            .unwrap();
        assert_eq!(results.previous_rating, 1000);
        assert_eq!(results.current_rating, 500);
        assert_eq!(results.rating_change, -500);
        assert_eq!(results.correct_answers, 0);
        assert_eq!(results.total_questions, 12);
    }
}
