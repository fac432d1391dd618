use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewTestRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub domain: String,
    pub score: i32,
    pub total: i32,
    pub performance: String,
    pub avg_time_ms: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuestionResultRow {
    pub id: i64,
    pub test_id: Uuid,
    pub position: i32,
    pub question_id: String,
    pub selected: i16,
    pub is_correct: bool,
    pub response_time_ms: i64,
    pub warned: bool,
}

/// A stored test with its per-question rows, in question order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredTest {
    #[serde(flatten)]
    pub test: InterviewTestRow,
    pub questions: Vec<QuestionResultRow>,
}
