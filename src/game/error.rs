use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("Pack with id {0} does not exist")]
    PackNotFound(i64),

    #[error("Question with id {0} does not exist")]
    QuestionNotFound(i64),

    #[error("Game session {0} does not exist")]
    SessionNotFound(Uuid),

    #[error("No active game session for pack {0}")]
    NoActiveSession(i64),

    #[error("No pack with questions is available")]
    NoPlayablePack,

    #[error("User {0} does not exist")]
    UserNotFound(Uuid),

    #[error("Pack {0} has no questions")]
    EmptyPack(i64),

    #[error("Pack {0} has more questions than a session can hold")]
    PackTooLarge(i64),

    #[error("Invalid answer: {0}")]
    InvalidAnswer(String),

    #[error("Question {submitted} is not the current question of the session")]
    StaleQuestion { submitted: i64, current: Option<i64> },

    #[error("Question at position {0} has already been answered")]
    AlreadyAnswered(usize),

    #[error("Game session {0} is already completed")]
    SessionCompleted(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
