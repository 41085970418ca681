use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_id: Uuid,
    pub resume_url: Option<String>,
    pub extracted_text: String,
    pub match_score: f64,
    pub applied_at: DateTime<Utc>,
}
