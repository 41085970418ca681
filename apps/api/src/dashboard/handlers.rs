//! Read-only dashboard aggregates for recruiters and applicants.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::{Applicant, Recruiter};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, FromRow)]
pub struct JobStats {
    pub job_id: Uuid,
    pub title: String,
    pub applicant_count: i64,
    pub top_match_score: f64,
}

#[derive(Debug, Serialize)]
pub struct RecruiterSummary {
    pub total_jobs: usize,
    pub total_applicants: i64,
    pub jobs: Vec<JobStats>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct ApplicationHistoryEntry {
    pub job_id: Uuid,
    pub title: String,
    pub applied_at: DateTime<Utc>,
    pub resume_url: Option<String>,
    pub company_name: String,
    pub location: String,
}

/// GET /api/v1/dashboard/recruiter/summary
pub async fn handle_recruiter_summary(
    State(state): State<AppState>,
    Recruiter(user): Recruiter,
) -> Result<Json<RecruiterSummary>, AppError> {
    let jobs = sqlx::query_as::<_, JobStats>(
        r#"
        SELECT j.job_id, j.title,
               COUNT(a.id) AS applicant_count,
               COALESCE(MAX(a.match_score), 0) AS top_match_score
        FROM jobs j
        LEFT JOIN applications a ON a.job_id = j.job_id
        WHERE j.created_by = $1
        GROUP BY j.job_id, j.title, j.created_at
        ORDER BY j.created_at DESC
        "#,
    )
    .bind(user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(summarize(jobs)))
}

fn summarize(jobs: Vec<JobStats>) -> RecruiterSummary {
    RecruiterSummary {
        total_jobs: jobs.len(),
        total_applicants: jobs.iter().map(|j| j.applicant_count).sum(),
        jobs,
    }
}

/// GET /api/v1/dashboard/applicant/applications
pub async fn handle_applicant_history(
    State(state): State<AppState>,
    Applicant(user): Applicant,
) -> Result<Json<Vec<ApplicationHistoryEntry>>, AppError> {
    let history = sqlx::query_as::<_, ApplicationHistoryEntry>(
        r#"
        SELECT j.job_id, j.title, a.applied_at, a.resume_url, j.company_name, j.location
        FROM applications a
        JOIN jobs j ON j.job_id = a.job_id
        WHERE a.user_id = $1
        ORDER BY a.applied_at DESC
        "#,
    )
    .bind(user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(history))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(count: i64, top: f64) -> JobStats {
        JobStats {
            job_id: Uuid::new_v4(),
            title: "Engineer".to_string(),
            applicant_count: count,
            top_match_score: top,
        }
    }

    #[test]
    fn test_summary_totals() {
        let summary = summarize(vec![stats(3, 80.0), stats(0, 0.0), stats(2, 40.5)]);
        assert_eq!(summary.total_jobs, 3);
        assert_eq!(summary.total_applicants, 5);
    }

    #[test]
    fn test_empty_summary() {
        let summary = summarize(vec![]);
        assert_eq!(summary.total_jobs, 0);
        assert_eq!(summary.total_applicants, 0);
        assert!(summary.jobs.is_empty());
    }
}
