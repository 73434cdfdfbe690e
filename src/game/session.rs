use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::game::{
    error::GameError,
    models::{
        Advance, CompletionResponse, GAME_COMPLETED_MESSAGE, GameSession, SessionSnapshot,
        SessionState, SessionView,
    },
};

impl GameSession {
    pub fn start(user_id: Uuid, pack_id: i64, questions_count: usize) -> Result<Self, GameError> {
        let questions_count =
            i32::try_from(questions_count).map_err(|_| GameError::PackTooLarge(pack_id))?;
        let now = Utc::now();

        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            pack_id,
            current_question_index: 0,
            questions_count,
            is_completed: false,
            correct_answers: 0,
            created_at: now,
            updated_at: now,
            completed_at: None,
        })
    }

    pub fn state(&self) -> SessionState {
        let index = usize::try_from(self.current_question_index).unwrap_or_default();

        match self.is_completed {
            true => SessionState::Completed { final_index: index },
            false => SessionState::Active { index },
        }
    }

    pub fn to_view(&self) -> SessionView {
        SessionView {
            id: self.id,
            current_question_index: self.current_question_index,
            questions_count: self.questions_count,
            is_completed: self.is_completed,
        }
    }

    pub fn completion(&self) -> CompletionResponse {
        CompletionResponse {
            message: GAME_COMPLETED_MESSAGE.to_string(),
            final_score: self.correct_answers,
            total_questions: self.questions_count,
        }
    }
}

impl SessionSnapshot {
    pub fn new(session: GameSession, question_ids: Vec<i64>) -> Self {
        Self {
            session,
            question_ids,
        }
    }

    fn index(&self) -> usize {
        match self.session.state() {
            SessionState::Active { index } => index,
            SessionState::Completed { final_index } => final_index,
        }
    }

    /// Question under the pointer, `None` when the pointer is out of range.
    pub fn current_question_id(&self) -> Option<i64> {
        self.question_ids.get(self.index()).copied()
    }

    fn previous_question_id(&self) -> Option<i64> {
        let index = self.index().checked_sub(1)?;
        self.question_ids.get(index).copied()
    }

    /// Returns the index an answer for `question_id` would be recorded at.
    pub fn ensure_answerable(&self, question_id: i64) -> Result<usize, GameError> {
        if self.session.is_completed {
            return Err(GameError::SessionCompleted(self.session.id));
        }

        let current = self.current_question_id();
        if current != Some(question_id) {
            return Err(GameError::StaleQuestion {
                submitted: question_id,
                current,
            });
        }

        Ok(self.index())
    }

    pub fn record_answer(&mut self, is_correct: bool, now: DateTime<Utc>) {
        if is_correct {
            self.session.correct_answers += 1;
        }
        self.session.updated_at = now;
    }

    pub fn advance(
        &mut self,
        from_question_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Advance, GameError> {
        let index = match self.session.state() {
            SessionState::Completed { .. } => return Ok(Advance::AlreadyCompleted),
            SessionState::Active { index } => index,
        };

        let current = self.current_question_id();
        if current != Some(from_question_id) {
            return match (self.previous_question_id(), current) {
                (Some(previous), Some(question_id)) if previous == from_question_id => {
                    Ok(Advance::Unchanged { question_id })
                }
                _ => Err(GameError::StaleQuestion {
                    submitted: from_question_id,
                    current,
                }),
            };
        }

        self.session.updated_at = now;

        if index + 1 < self.question_ids.len() {
            self.session.current_question_index += 1;
            return Ok(Advance::Moved {
                question_id: self.question_ids[index + 1],
            });
        }

        self.session.is_completed = true;
        self.session.completed_at = Some(now);
        Ok(Advance::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(question_ids: Vec<i64>) -> SessionSnapshot {
        let session = GameSession::start(Uuid::new_v4(), 1, question_ids.len()).unwrap();
        SessionSnapshot::new(session, question_ids)
    }

    #[test]
    fn new_session_points_at_first_question() {
        let snapshot = snapshot(vec![11, 12, 13]);
        assert_eq!(snapshot.current_question_id(), Some(11));
        assert_eq!(snapshot.session.state(), SessionState::Active { index: 0 });
    }

    #[test]
    fn advancing_count_times_completes_once() {
        let mut snapshot = snapshot(vec![11, 12, 13]);
        let now = Utc::now();

        assert_eq!(
            snapshot.advance(11, now).unwrap(),
            Advance::Moved { question_id: 12 }
        );
        assert_eq!(
            snapshot.advance(12, now).unwrap(),
            Advance::Moved { question_id: 13 }
        );
        assert_eq!(snapshot.advance(13, now).unwrap(), Advance::Completed);
        assert_eq!(snapshot.advance(13, now).unwrap(), Advance::AlreadyCompleted);
        assert_eq!(snapshot.advance(11, now).unwrap(), Advance::AlreadyCompleted);

        assert!(snapshot.session.is_completed);
        assert_eq!(snapshot.session.current_question_index, 2);
        assert_eq!(snapshot.session.completed_at, Some(now));
    }

    #[test]
    fn index_never_passes_last_question_and_never_decreases() {
        let mut snapshot = snapshot(vec![1, 2, 3, 4]);
        let mut last = snapshot.session.current_question_index;

        for from in [1, 1, 2, 7, 2, 3, 4, 4, 1] {
            let _ = snapshot.advance(from, Utc::now());
            let index = snapshot.session.current_question_index;
            assert!(index >= last);
            assert!(index <= snapshot.session.questions_count - 1);
            last = index;
        }
    }

    #[test]
    fn retried_advance_returns_current_question_unchanged() {
        let mut snapshot = snapshot(vec![5, 6, 7]);
        snapshot.advance(5, Utc::now()).unwrap();

        assert_eq!(
            snapshot.advance(5, Utc::now()).unwrap(),
            Advance::Unchanged { question_id: 6 }
        );
        assert_eq!(snapshot.session.current_question_index, 1);
    }

    #[test]
    fn advancing_from_unrelated_question_is_stale() {
        let mut snapshot = snapshot(vec![5, 6, 7]);
        let result = snapshot.advance(7, Utc::now());

        assert!(matches!(
            result,
            Err(GameError::StaleQuestion {
                submitted: 7,
                current: Some(5)
            })
        ));
        assert_eq!(snapshot.session.current_question_index, 0);
    }

    #[test]
    fn answering_non_current_question_is_stale() {
        let snapshot = snapshot(vec![5, 6]);
        assert!(matches!(
            snapshot.ensure_answerable(6),
            Err(GameError::StaleQuestion { .. })
        ));
        assert_eq!(snapshot.ensure_answerable(5).unwrap(), 0);
    }

    #[test]
    fn completed_session_rejects_answers() {
        let mut snapshot = snapshot(vec![5]);
        snapshot.advance(5, Utc::now()).unwrap();

        assert!(matches!(
            snapshot.ensure_answerable(5),
            Err(GameError::SessionCompleted(_))
        ));
    }

    #[test]
    fn out_of_range_pointer_has_no_current_question() {
        let mut snapshot = snapshot(vec![5]);
        snapshot.session.current_question_index = 3;
        assert_eq!(snapshot.current_question_id(), None);
    }

    #[test]
    fn correct_answers_raise_score() {
        let mut snapshot = snapshot(vec![5, 6]);
        snapshot.record_answer(true, Utc::now());
        snapshot.record_answer(false, Utc::now());

        assert_eq!(snapshot.session.correct_answers, 1);
        assert_eq!(snapshot.session.completion().final_score, 1);
        assert_eq!(snapshot.session.completion().total_questions, 2);
    }

    #[test]
    fn oversized_question_count_is_rejected() {
        let result = GameSession::start(Uuid::new_v4(), 9, i32::MAX as usize + 1);
        assert!(matches!(result, Err(GameError::PackTooLarge(9))));

        let session = GameSession::start(Uuid::new_v4(), 9, i32::MAX as usize).unwrap();
        assert_eq!(session.questions_count, i32::MAX);
    }
}
