use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::filters::JobFilters;
use crate::models::job::{JobRow, JOB_COLUMNS};

/// Returns any job by id, active or not.
pub async fn find_job(pool: &PgPool, job_id: Uuid) -> Result<Option<JobRow>, AppError> {
    Ok(
        sqlx::query_as::<_, JobRow>(&format!("SELECT {JOB_COLUMNS} FROM jobs j WHERE j.job_id = $1"))
            .bind(job_id)
            .fetch_optional(pool)
            .await?,
    )
}

/// Returns the job only if `owner` created it; 404 otherwise.
pub async fn find_owned_job(pool: &PgPool, job_id: Uuid, owner: Uuid) -> Result<JobRow, AppError> {
    sqlx::query_as::<_, JobRow>(&format!(
        "SELECT {JOB_COLUMNS} FROM jobs j WHERE j.job_id = $1 AND j.created_by = $2"
    ))
    .bind(job_id)
    .bind(owner)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Job not found".to_string()))
}

/// Jobs posted by a recruiter, newest first.
pub async fn list_owned_jobs(pool: &PgPool, owner: Uuid) -> Result<Vec<JobRow>, AppError> {
    Ok(sqlx::query_as::<_, JobRow>(&format!(
        "SELECT {JOB_COLUMNS} FROM jobs j WHERE j.created_by = $1 ORDER BY j.created_at DESC"
    ))
    .bind(owner)
    .fetch_all(pool)
    .await?)
}

/// Counts active jobs matching the filters.
pub async fn count_active_jobs(pool: &PgPool, filters: &JobFilters) -> Result<i64, AppError> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM jobs j WHERE j.is_active = TRUE");
    filters.push_conditions(&mut qb);
    Ok(qb.build_query_scalar::<i64>().fetch_one(pool).await?)
}

/// One page of active jobs matching the filters, newest first.
pub async fn list_active_jobs(
    pool: &PgPool,
    filters: &JobFilters,
    limit: i64,
    offset: i64,
) -> Result<Vec<JobRow>, AppError> {
    let mut qb = QueryBuilder::<Postgres>::new(format!(
        "SELECT {JOB_COLUMNS} FROM jobs j WHERE j.is_active = TRUE"
    ));
    filters.push_conditions(&mut qb);
    qb.push(" ORDER BY j.created_at DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);

    Ok(qb.build_query_as::<JobRow>().fetch_all(pool).await?)
}

/// Flips `is_active` on an owned job. Returns false when no such job is owned.
pub async fn set_job_active(
    pool: &PgPool,
    job_id: Uuid,
    owner: Uuid,
    active: bool,
) -> Result<bool, AppError> {
    let result = sqlx::query(
        "UPDATE jobs SET is_active = $1, updated_at = NOW() WHERE job_id = $2 AND created_by = $3",
    )
    .bind(active)
    .bind(job_id)
    .bind(owner)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}
