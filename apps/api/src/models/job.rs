use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::user::Role;

/// Column list for job reads; always carries the live applicant count.
pub const JOB_COLUMNS: &str = r#"
    j.job_id, j.created_by, j.title, j.description, j.company_name, j.requirements,
    j.keywords, j.location, j.experience_required, j.salary_min, j.salary_max,
    j.is_active, j.created_at, j.updated_at,
    (SELECT COUNT(*) FROM applications a WHERE a.job_id = j.job_id) AS applicant_count
"#;

#[derive(Debug, Clone, FromRow)]
pub struct JobRow {
    pub job_id: Uuid,
    pub created_by: Uuid,
    pub title: String,
    pub description: String,
    pub company_name: String,
    pub requirements: String,
    pub keywords: Vec<String>,
    pub location: String,
    pub experience_required: String,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub applicant_count: i64,
}

/// Job as returned over HTTP. Keywords are only shown to recruiters.
#[derive(Debug, Clone, Serialize)]
pub struct JobView {
    pub job_id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    pub location: String,
    pub experience_required: String,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub applicant_count: i64,
    pub company_name: String,
    pub requirements: String,
}

impl JobView {
    pub fn for_viewer(row: JobRow, viewer: Option<Role>) -> Self {
        let keywords = match viewer {
            Some(Role::Recruiter) => Some(row.keywords),
            _ => None,
        };
        Self {
            job_id: row.job_id,
            title: row.title,
            description: row.description,
            keywords,
            location: row.location,
            experience_required: row.experience_required,
            salary_min: row.salary_min,
            salary_max: row.salary_max,
            is_active: row.is_active,
            created_at: row.created_at,
            applicant_count: row.applicant_count,
            company_name: row.company_name,
            requirements: row.requirements,
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_job(keywords: &[&str]) -> JobRow {
    JobRow {
        job_id: Uuid::new_v4(),
        created_by: Uuid::new_v4(),
        title: "Backend Engineer".to_string(),
        description: "Build APIs".to_string(),
        company_name: "Acme".to_string(),
        requirements: String::new(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        location: "Remote".to_string(),
        experience_required: "3".to_string(),
        salary_min: Some(50_000),
        salary_max: Some(90_000),
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        applicant_count: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_visible_to_recruiters_only() {
        let recruiter = serde_json::to_value(JobView::for_viewer(
            sample_job(&["rust"]),
            Some(Role::Recruiter),
        ))
        .unwrap();
        assert_eq!(recruiter["keywords"], serde_json::json!(["rust"]));

        let applicant = serde_json::to_value(JobView::for_viewer(
            sample_job(&["rust"]),
            Some(Role::Applicant),
        ))
        .unwrap();
        assert!(applicant.get("keywords").is_none());

        let anonymous =
            serde_json::to_value(JobView::for_viewer(sample_job(&["rust"]), None)).unwrap();
        assert!(anonymous.get("keywords").is_none());
    }
}
