use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const RATING_FLOOR: i32 = 500;
pub const DEFAULT_RATING: i32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingUpdate {
    pub previous: i32,
    pub new: i32,
    /// What actually moved after the floor clamp.
    pub applied_change: i32,
}

/// Applies a signed delta to a rating, never going below `RATING_FLOOR`.
pub fn apply_rating_delta(rating: i32, delta: i32) -> RatingUpdate {
    let new = rating.saturating_add(delta).max(RATING_FLOOR);

    RatingUpdate {
        previous: rating,
        new,
        applied_change: new - rating,
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct RatingHistoryEntry {
    pub rating: i32,
    pub change: i32,
    pub session_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RatingResponse {
    pub user_id: Uuid,
    pub rating: i32,
}
