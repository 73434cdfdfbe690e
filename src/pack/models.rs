use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Wire id meaning "any playable pack".
pub const RANDOM_PACK_ID: i64 = 0;

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Question {
    pub id: i64,
    pub question_text: String,
    pub answer_text: String,
    pub note: Option<String>,
    pub difficulty: i16,
    pub image_url: Option<String>,
    pub author_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Question {
    pub fn to_view(&self) -> QuestionView {
        QuestionView {
            id: self.id,
            question_text: self.question_text.clone(),
        }
    }

    pub fn to_detail(&self) -> QuestionDetail {
        QuestionDetail {
            id: self.id,
            question_text: self.question_text.clone(),
            difficulty: self.difficulty,
            note: self.note.clone(),
            image_url: self.image_url.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Pack {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub author_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackSelector {
    Random,
    Pack(i64),
}

impl From<i64> for PackSelector {
    fn from(pack_id: i64) -> Self {
        match pack_id {
            RANDOM_PACK_ID => PackSelector::Random,
            id => PackSelector::Pack(id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct PackCandidate {
    pub id: i64,
    pub question_count: i64,
}

/// Picks a pack uniformly at random, discarding empty picks and trying again.
/// Every failed pick shrinks the candidate set, so this runs at most once per pack.
pub fn select_playable_pack<R: Rng + ?Sized>(
    mut candidates: Vec<PackCandidate>,
    rng: &mut R,
) -> Option<i64> {
    while !candidates.is_empty() {
        let idx = rng.random_range(0..candidates.len());
        let candidate = candidates.swap_remove(idx);
        if candidate.question_count > 0 {
            return Some(candidate.id);
        }
    }

    None
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub id: i64,
    pub question_text: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct QuestionDetail {
    pub id: i64,
    pub question_text: String,
    pub difficulty: i16,
    pub note: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PackQuestionsResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub questions: Vec<QuestionDetail>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PackSummary {
    pub id: i64,
    pub name: String,
}

impl From<&Pack> for PackSummary {
    fn from(pack: &Pack) -> Self {
        Self {
            id: pack.id,
            name: pack.name.clone(),
        }
    }
}
