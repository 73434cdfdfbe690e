use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pack::models::{PackSummary, QuestionView};

pub const GAME_COMPLETED_MESSAGE: &str = "Game completed";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct GameSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub pack_id: i64,
    pub current_question_index: i32,
    pub questions_count: i32,
    pub is_completed: bool,
    pub correct_answers: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active { index: usize },
    Completed { final_index: usize },
}

/// A session together with the question ids captured when it started.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub session: GameSession,
    pub question_ids: Vec<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved { question_id: i64 },
    Completed,
    /// The caller already advanced past `from_question_id`; nothing changed.
    Unchanged { question_id: i64 },
    AlreadyCompleted,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GameAnswer {
    pub session_id: Uuid,
    pub question_index: i32,
    pub question_id: i64,
    pub submitted_answer: String,
    pub is_correct: bool,
    pub rating_change: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub id: Uuid,
    pub current_question_index: i32,
    pub questions_count: i32,
    pub is_completed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StartSessionResponse {
    pub real_pack_id: i64,
    pub first_question: QuestionView,
    pub session: SessionView,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitAnswerRequest {
    pub answer: String,
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitAnswerResponse {
    pub is_correct: bool,
    pub correct_answer: String,
    pub current_score: i32,
    pub rating_change: i32,
    pub new_rating: i32,
    pub session: SessionView,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CompletionResponse {
    pub message: String,
    pub final_score: i32,
    pub total_questions: i32,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NextResponse {
    Question {
        question: QuestionView,
        session: SessionView,
    },
    Completed(CompletionResponse),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CurrentQuestionResponse {
    pub question: Option<QuestionView>,
    pub session: SessionView,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ResultsResponse {
    pub correct_answers: i32,
    pub total_questions: i32,
    pub previous_rating: i32,
    pub current_rating: i32,
    pub rating_change: i32,
    pub pack: PackSummary,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct SessionQuery {
    pub session_id: Option<Uuid>,
}
