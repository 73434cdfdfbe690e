use crate::{game::error::GameError, pack::models::Question};

/// Rating points per difficulty level.
pub const DIFFICULTY_WEIGHT: i32 = 10;
pub const MAX_ANSWER_LENGTH: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub is_correct: bool,
    pub rating_delta: i32,
}

pub fn normalize_answer(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn validate_answer(raw: &str) -> Result<(), GameError> {
    if raw.chars().count() > MAX_ANSWER_LENGTH {
        return Err(GameError::InvalidAnswer(format!(
            "Answer must be at most {} characters",
            MAX_ANSWER_LENGTH
        )));
    }

    Ok(())
}

pub fn evaluate(question: &Question, raw_answer: &str) -> Evaluation {
    evaluate_answer(&question.answer_text, question.difficulty, raw_answer)
}

pub fn evaluate_answer(answer_key: &str, difficulty: i16, raw_answer: &str) -> Evaluation {
    let is_correct = normalize_answer(answer_key) == normalize_answer(raw_answer);
    let magnitude = i32::from(difficulty) * DIFFICULTY_WEIGHT;

    Evaluation {
        is_correct,
        rating_delta: if is_correct { magnitude } else { -magnitude },
    }
}
