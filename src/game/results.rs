use crate::{
    game::models::{GameAnswer, GameSession, ResultsResponse},
    pack::models::PackSummary,
};

/// Results are only scored for completed sessions. Anything else reports the
/// current rating with no change.
pub fn compute_results(
    session: Option<&GameSession>,
    answers: &[GameAnswer],
    current_rating: i32,
    pack: PackSummary,
) -> ResultsResponse {
    let Some(session) = session else {
        return ResultsResponse {
            correct_answers: 0,
            total_questions: 0,
            previous_rating: current_rating,
            current_rating,
            rating_change: 0,
            pack,
        };
    };

    if !session.is_completed {
        return ResultsResponse {
            correct_answers: 0,
            total_questions: session.questions_count,
            previous_rating: current_rating,
            current_rating,
            rating_change: 0,
            pack,
        };
    }

    let rating_change: i32 = answers.iter().map(|a| a.rating_change).sum();

    ResultsResponse {
        correct_answers: session.correct_answers,
        total_questions: session.questions_count,
        previous_rating: current_rating - rating_change,
        current_rating,
        rating_change,
        pack,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn pack() -> PackSummary {
        PackSummary {
            id: 3,
            name: "Animals".to_string(),
        }
    }

    fn answer(session_id: Uuid, index: i32, is_correct: bool, rating_change: i32) -> GameAnswer {
        GameAnswer {
            session_id,
            question_index: index,
            question_id: i64::from(index) + 100,
            submitted_answer: String::new(),
            is_correct,
            rating_change,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn completed_session_sums_applied_changes() {
        let mut session = GameSession::start(Uuid::new_v4(), 3, 2).unwrap();
        session.is_completed = true;
        session.correct_answers = 1;
        let answers = vec![answer(session.id, 0, true, 20), answer(session.id, 1, false, -50)];

        let results = compute_results(Some(&session), &answers, 970, pack());

        assert_eq!(results.correct_answers, 1);
        assert_eq!(results.total_questions, 2);
        assert_eq!(results.previous_rating, 1000);
        assert_eq!(results.current_rating, 970);
        assert_eq!(results.rating_change, -30);
        assert_eq!(results.pack, pack());
    }

    #[test]
    fn active_session_reports_no_change() {
        let mut session = GameSession::start(Uuid::new_v4(), 3, 4).unwrap();
        session.correct_answers = 2;
        let answers = vec![answer(session.id, 0, true, 20)];

        let results = compute_results(Some(&session), &answers, 1020, pack());

        assert_eq!(results.correct_answers, 0);
        assert_eq!(results.total_questions, 4);
        assert_eq!(results.previous_rating, 1020);
        assert_eq!(results.rating_change, 0);
    }

    #[test]
    fn missing_session_is_zeroed() {
        let results = compute_results(None, &[], 1000, pack());

        assert_eq!(results.total_questions, 0);
        assert_eq!(results.previous_rating, 1000);
        assert_eq!(results.current_rating, 1000);
    }
}
