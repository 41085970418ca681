//! Axum route handlers for job applications.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::applications::intake::{submit_application, ApplicationReceipt, ResumeUpload};
use crate::auth::{Applicant, Recruiter};
use crate::errors::AppError;
use crate::jobs::queries::find_owned_job;
use crate::state::AppState;

const RESUME_FIELD: &str = "resume";

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, FromRow)]
struct ApplicantRow {
    id: Uuid,
    username: String,
    full_name: String,
    skills: Value,
    match_score: f64,
    resume_url: Option<String>,
    applied_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct CandidateSummary {
    pub username: String,
    pub full_name: String,
    pub skills: Value,
}

#[derive(Debug, Serialize)]
pub struct ApplicantEntry {
    pub id: Uuid,
    pub candidate: CandidateSummary,
    pub match_score: f64,
    pub resume_file: Option<String>,
    pub applied_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct JobApplicantsResponse {
    pub job_id: Uuid,
    pub total_applicants: usize,
    pub applicants: Vec<ApplicantEntry>,
}

#[derive(Debug, FromRow)]
struct MyApplicationRow {
    id: Uuid,
    job_id: Uuid,
    resume_url: Option<String>,
    match_score: f64,
    applied_at: DateTime<Utc>,
    title: String,
    company_name: String,
    location: String,
    description: String,
    experience_required: String,
    salary_min: Option<i32>,
    salary_max: Option<i32>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct JobDetails {
    pub job_id: Uuid,
    pub title: String,
    pub company_name: String,
    pub location: String,
    pub description: String,
    pub experience_required: String,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct MyApplication {
    pub id: Uuid,
    pub job: Uuid,
    pub job_details: JobDetails,
    pub resume_file: Option<String>,
    pub match_score: f64,
    pub applied_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct MyApplicationsResponse {
    pub message: String,
    pub total_applications: usize,
    pub applications: Vec<MyApplication>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/applications/:job_id/apply
///
/// Multipart body with a `resume` PDF file.
pub async fn handle_apply(
    State(state): State<AppState>,
    Applicant(user): Applicant,
    Path(job_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApplicationReceipt>), AppError> {
    let resume = read_resume_field(multipart).await?;
    let receipt =
        submit_application(&state.db, state.storage.as_ref(), user.id, job_id, resume).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// GET /api/v1/applications/:job_id/applicants
///
/// Owner-only; best match first.
pub async fn handle_job_applicants(
    State(state): State<AppState>,
    Recruiter(user): Recruiter,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobApplicantsResponse>, AppError> {
    find_owned_job(&state.db, job_id, user.id).await?;

    let rows = sqlx::query_as::<_, ApplicantRow>(
        r#"
        SELECT a.id, u.username, u.full_name, u.skills, a.match_score, a.resume_url, a.applied_at
        FROM applications a
        JOIN users u ON u.id = a.user_id
        WHERE a.job_id = $1
        ORDER BY a.match_score DESC, a.applied_at ASC
        "#,
    )
    .bind(job_id)
    .fetch_all(&state.db)
    .await?;

    let applicants: Vec<ApplicantEntry> = rows
        .into_iter()
        .map(|r| ApplicantEntry {
            id: r.id,
            candidate: CandidateSummary {
                username: r.username,
                full_name: r.full_name,
                skills: r.skills,
            },
            match_score: r.match_score,
            resume_file: r.resume_url,
            applied_at: r.applied_at,
        })
        .collect();

    Ok(Json(JobApplicantsResponse {
        job_id,
        total_applicants: applicants.len(),
        applicants,
    }))
}

/// GET /api/v1/applications/mine
pub async fn handle_my_applications(
    State(state): State<AppState>,
    Applicant(user): Applicant,
) -> Result<Json<MyApplicationsResponse>, AppError> {
    let rows = sqlx::query_as::<_, MyApplicationRow>(
        r#"
        SELECT a.id, a.job_id, a.resume_url, a.match_score, a.applied_at,
               j.title, j.company_name, j.location, j.description, j.experience_required,
               j.salary_min, j.salary_max, j.is_active, j.created_at
        FROM applications a
        JOIN jobs j ON j.job_id = a.job_id
        WHERE a.user_id = $1
        ORDER BY a.applied_at DESC
        "#,
    )
    .bind(user.id)
    .fetch_all(&state.db)
    .await?;

    let applications: Vec<MyApplication> = rows
        .into_iter()
        .map(|r| MyApplication {
            id: r.id,
            job: r.job_id,
            job_details: JobDetails {
                job_id: r.job_id,
                title: r.title,
                company_name: r.company_name,
                location: r.location,
                description: r.description,
                experience_required: r.experience_required,
                salary_min: r.salary_min,
                salary_max: r.salary_max,
                is_active: r.is_active,
                created_at: r.created_at,
            },
            resume_file: r.resume_url,
            match_score: r.match_score,
            applied_at: r.applied_at,
        })
        .collect();

    let message = if applications.is_empty() {
        "No applications found"
    } else {
        "Applications retrieved successfully"
    };

    Ok(Json(MyApplicationsResponse {
        message: message.to_string(),
        total_applications: applications.len(),
        applications,
    }))
}

/// Pulls the `resume` file out of the form. Other fields, and a `resume`
/// part sent as plain text rather than a file, are ignored.
async fn read_resume_field(mut multipart: Multipart) -> Result<Option<ResumeUpload>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some(RESUME_FIELD) {
            continue;
        }
        let Some(filename) = field.file_name().map(String::from) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read resume upload: {e}")))?;
        return Ok(Some(ResumeUpload {
            filename: Some(filename),
            bytes,
        }));
    }
    Ok(None)
}
