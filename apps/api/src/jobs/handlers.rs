//! Axum route handlers for job postings.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::auth::{AuthUser, Recruiter};
use crate::errors::AppError;
use crate::jobs::filters::{JobFilters, JobListQuery};
use crate::jobs::queries::{
    count_active_jobs, find_job, find_owned_job, list_active_jobs, list_owned_jobs,
    set_job_active,
};
use crate::jobs::validation::{JobPatch, JobPayload};
use crate::models::job::JobView;
use crate::models::user::Role;
use crate::pagination::{resolve_page, Paginated, JOB_PAGE_SIZE};
use crate::state::AppState;

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    Recruiter(user): Recruiter,
    Json(payload): Json<JobPayload>,
) -> Result<(StatusCode, Json<JobView>), AppError> {
    let job = payload.validated()?;
    let job_id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO jobs
            (job_id, created_by, title, description, company_name, requirements,
             keywords, location, experience_required, salary_min, salary_max)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(job_id)
    .bind(user.id)
    .bind(&job.title)
    .bind(&job.description)
    .bind(&job.company_name)
    .bind(&job.requirements)
    .bind(&job.keywords)
    .bind(&job.location)
    .bind(&job.experience_required)
    .bind(job.salary_min)
    .bind(job.salary_max)
    .execute(&state.db)
    .await?;

    info!("Recruiter {} posted job {job_id}", user.id);

    let row = find_owned_job(&state.db, job_id, user.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(JobView::for_viewer(row, Some(Role::Recruiter))),
    ))
}

/// GET /api/v1/jobs
///
/// Active jobs, newest first, ten per page.
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    viewer: Option<AuthUser>,
    Query(query): Query<JobListQuery>,
) -> Result<Json<Paginated<JobView>>, AppError> {
    let filters = JobFilters::from_query(&query)?;

    let total = count_active_jobs(&state.db, &filters).await?;
    let window = resolve_page(query.page.as_deref(), total, JOB_PAGE_SIZE)?;
    let rows = list_active_jobs(&state.db, &filters, window.limit, window.offset).await?;

    let role = viewer.map(|v| v.role);
    let results = rows
        .into_iter()
        .map(|row| JobView::for_viewer(row, role))
        .collect();

    Ok(Json(Paginated::new(
        "Jobs fetched successfully",
        window,
        total,
        results,
    )))
}

/// GET /api/v1/jobs/me
pub async fn handle_my_jobs(
    State(state): State<AppState>,
    Recruiter(user): Recruiter,
) -> Result<Json<Vec<JobView>>, AppError> {
    let rows = list_owned_jobs(&state.db, user.id).await?;
    Ok(Json(
        rows.into_iter()
            .map(|row| JobView::for_viewer(row, Some(Role::Recruiter)))
            .collect(),
    ))
}

/// GET /api/v1/jobs/:job_id
pub async fn handle_get_job(
    State(state): State<AppState>,
    viewer: Option<AuthUser>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobView>, AppError> {
    let row = find_job(&state.db, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;
    Ok(Json(JobView::for_viewer(row, viewer.map(|v| v.role))))
}

/// PATCH /api/v1/jobs/:job_id
///
/// Owner-only partial update; the merged job is validated as a whole.
pub async fn handle_update_job(
    State(state): State<AppState>,
    Recruiter(user): Recruiter,
    Path(job_id): Path<Uuid>,
    Json(patch): Json<JobPatch>,
) -> Result<Json<JobView>, AppError> {
    let existing = find_owned_job(&state.db, job_id, user.id).await?;
    let job = JobPayload::merged(&existing, patch).validated()?;

    sqlx::query(
        r#"
        UPDATE jobs
        SET title = $1, description = $2, company_name = $3, requirements = $4,
            keywords = $5, location = $6, experience_required = $7,
            salary_min = $8, salary_max = $9, updated_at = NOW()
        WHERE job_id = $10 AND created_by = $11
        "#,
    )
    .bind(&job.title)
    .bind(&job.description)
    .bind(&job.company_name)
    .bind(&job.requirements)
    .bind(&job.keywords)
    .bind(&job.location)
    .bind(&job.experience_required)
    .bind(job.salary_min)
    .bind(job.salary_max)
    .bind(job_id)
    .bind(user.id)
    .execute(&state.db)
    .await?;

    let row = find_owned_job(&state.db, job_id, user.id).await?;
    Ok(Json(JobView::for_viewer(row, Some(Role::Recruiter))))
}

/// PATCH /api/v1/jobs/:job_id/activate
pub async fn handle_activate_job(
    State(state): State<AppState>,
    Recruiter(user): Recruiter,
    Path(job_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if !set_job_active(&state.db, job_id, user.id, true).await? {
        return Err(AppError::NotFound("Job not found".to_string()));
    }
    Ok(Json(json!({ "message": "Job activated" })))
}

/// PATCH /api/v1/jobs/:job_id/deactivate
pub async fn handle_deactivate_job(
    State(state): State<AppState>,
    Recruiter(user): Recruiter,
    Path(job_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if !set_job_active(&state.db, job_id, user.id, false).await? {
        return Err(AppError::NotFound("Job not found".to_string()));
    }
    Ok(Json(json!({ "message": "Job deactivated" })))
}

/// DELETE /api/v1/jobs/:job_id
pub async fn handle_delete_job(
    State(state): State<AppState>,
    Recruiter(user): Recruiter,
    Path(job_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM jobs WHERE job_id = $1 AND created_by = $2")
        .bind(job_id)
        .bind(user.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Job not found".to_string()));
    }
    info!("Recruiter {} deleted job {job_id}", user.id);
    Ok(StatusCode::NO_CONTENT)
}
