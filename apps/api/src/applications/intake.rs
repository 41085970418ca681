//! Resume intake — one application per (user, job), scored and stored.
//!
//! The application row is inserted first, inside a transaction, so a
//! concurrent duplicate blocks on the `(user_id, job_id)` unique index and is
//! rejected once this request commits. The row only commits after the resume
//! upload succeeds; any failure rolls it back.

use bytes::Bytes;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::applications::matching::{compute_match_score, extract_resume_text};
use crate::applications::storage::{resume_object_key, ResumeStorage, PDF_CONTENT_TYPE};
use crate::db::is_unique_violation;
use crate::errors::AppError;
use crate::models::application::ApplicationRow;

const UNIQUE_APPLICATION: &str = "applications_user_job_key";

/// The uploaded `resume` form field.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub filename: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug, Serialize)]
pub struct ApplicationReceipt {
    pub message: String,
    pub match_score: f64,
    pub resume_url: String,
    pub application_id: Uuid,
}

fn already_applied() -> AppError {
    AppError::Validation("Already applied to this job".to_string())
}

pub async fn submit_application(
    pool: &PgPool,
    storage: &dyn ResumeStorage,
    user_id: Uuid,
    job_id: Uuid,
    resume: Option<ResumeUpload>,
) -> Result<ApplicationReceipt, AppError> {
    // 1. Job must exist and accept applications
    let keywords: Vec<String> =
        sqlx::query_scalar("SELECT keywords FROM jobs WHERE job_id = $1 AND is_active = TRUE")
            .bind(job_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Job not found or inactive".to_string()))?;

    // 2. Resume is mandatory
    let resume =
        resume.ok_or_else(|| AppError::Validation("Resume file is required".to_string()))?;

    // 3. Fast duplicate check; the unique index below is authoritative
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM applications WHERE user_id = $1 AND job_id = $2)",
    )
    .bind(user_id)
    .bind(job_id)
    .fetch_one(pool)
    .await?;
    if exists {
        return Err(already_applied());
    }

    // 4. Extract and score
    let extracted_text = extract_blocking(resume.bytes.clone()).await;
    let match_score = compute_match_score(&extracted_text, &keywords);
    info!(
        "Scored resume for user {user_id} job {job_id}: {match_score} ({} keywords)",
        keywords.len()
    );

    // 5. Claim the (user, job) slot
    let mut tx = pool.begin().await?;
    let claimed = sqlx::query_as::<_, ApplicationRow>(
        r#"
        INSERT INTO applications (id, user_id, job_id, extracted_text, match_score)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(job_id)
    .bind(&extracted_text)
    .bind(match_score)
    .fetch_one(&mut *tx)
    .await;

    let application = match claimed {
        Ok(row) => row,
        Err(e) if is_unique_violation(&e, Some(UNIQUE_APPLICATION)) => {
            return Err(already_applied())
        }
        Err(e) => return Err(e.into()),
    };

    // 6. Upload; dropping `tx` on error rolls the claim back
    let key = resume_object_key(user_id, job_id, resume.filename.as_deref());
    storage
        .upload(&key, resume.bytes, PDF_CONTENT_TYPE)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;
    let resume_url = storage.public_url(&key);

    // 7. Complete and commit
    sqlx::query("UPDATE applications SET resume_url = $1 WHERE id = $2")
        .bind(&resume_url)
        .bind(application.id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    info!("Application {} persisted for user {user_id} job {job_id}", application.id);

    Ok(ApplicationReceipt {
        message: "Application submitted successfully".to_string(),
        match_score,
        resume_url,
        application_id: application.id,
    })
}

/// PDF parsing is CPU bound; it runs on the blocking pool and degrades to empty text.
async fn extract_blocking(bytes: Bytes) -> String {
    tokio::task::spawn_blocking(move || extract_resume_text(&bytes))
        .await
        .unwrap_or_else(|e| {
            warn!("Resume extraction task failed: {e}");
            String::new()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::applications::matching::test_pdf;
    use crate::applications::storage::memory::MemoryStorage;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[tokio::test]
    async fn test_extract_blocking_degrades_to_empty() {
        assert_eq!(extract_blocking(Bytes::from_static(b"garbage")).await, "");
    }

    #[test]
    fn test_duplicate_is_client_error() {
        assert_eq!(
            already_applied().into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }

    async fn insert_user(pool: &PgPool, username: &str, role: &str) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, role) VALUES ($1, $2, $3, 'x', $4)",
        )
        .bind(id)
        .bind(username)
        .bind(format!("{username}@example.com"))
        .bind(role)
        .execute(pool)
        .await
        .unwrap();
        id
    }

    /// A recruiter's job with `keywords`, plus an applicant. Returns (applicant, job).
    async fn seed(pool: &PgPool, keywords: &[&str], active: bool) -> (Uuid, Uuid) {
        let recruiter = insert_user(pool, "recruiter", "recruiter").await;
        let applicant = insert_user(pool, "applicant", "applicant").await;
        let job_id = Uuid::new_v4();
        let keywords: Vec<String> = keywords.iter().map(|k| k.to_string()).collect();
        sqlx::query(
            r#"
            INSERT INTO jobs (job_id, created_by, title, description, company_name,
                              keywords, location, experience_required, is_active)
            VALUES ($1, $2, 'Backend Engineer', 'Build APIs', 'Acme', $3, 'Remote', '2 years', $4)
            "#,
        )
        .bind(job_id)
        .bind(recruiter)
        .bind(&keywords)
        .bind(active)
        .execute(pool)
        .await
        .unwrap();
        (applicant, job_id)
    }

    async fn application_count(pool: &PgPool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM applications")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    fn resume() -> Option<ResumeUpload> {
        Some(ResumeUpload {
            filename: Some("cv.pdf".to_string()),
            bytes: Bytes::from(test_pdf::with_pages(&["Java developer", "SQL Docker"])),
        })
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_apply_stores_score_and_public_url(pool: PgPool) {
        let (user, job) = seed(&pool, &["java", "sql", "docker", "aws"], true).await;
        let storage = MemoryStorage::default();

        let receipt = submit_application(&pool, &storage, user, job, resume())
            .await
            .unwrap();

        assert_eq!(receipt.match_score, 75.0);
        let key = format!("{user}/{job}/cv.pdf");
        assert_eq!(receipt.resume_url, storage.public_url(&key));
        assert_eq!(
            storage.objects.lock().unwrap()[&key].1,
            PDF_CONTENT_TYPE.to_string()
        );

        let row = sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE id = $1")
            .bind(receipt.application_id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(row.user_id, user);
        assert_eq!(row.job_id, job);
        assert_eq!(row.match_score, 75.0);
        assert_eq!(row.resume_url.as_deref(), Some(receipt.resume_url.as_str()));
        assert_eq!(row.extracted_text, "java developer sql docker");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_failed_upload_leaves_no_application(pool: PgPool) {
        let (user, job) = seed(&pool, &["java"], true).await;

        let err = submit_application(&pool, &MemoryStorage::failing(), user, job, resume())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Storage(_)));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(application_count(&pool).await, 0);

        // The slot is free again once the store recovers.
        submit_application(&pool, &MemoryStorage::default(), user, job, resume())
            .await
            .unwrap();
        assert_eq!(application_count(&pool).await, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_second_application_rejected(pool: PgPool) {
        let (user, job) = seed(&pool, &["java"], true).await;
        let storage = MemoryStorage::default();

        submit_application(&pool, &storage, user, job, resume())
            .await
            .unwrap();
        let err = submit_application(&pool, &storage, user, job, resume())
            .await
            .unwrap_err();

        assert!(matches!(&err, AppError::Validation(m) if m == "Already applied to this job"));
        assert_eq!(application_count(&pool).await, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_concurrent_applications_insert_once(pool: PgPool) {
        let (user, job) = seed(&pool, &["java"], true).await;
        let storage = MemoryStorage::default();

        let (first, second) = tokio::join!(
            submit_application(&pool, &storage, user, job, resume()),
            submit_application(&pool, &storage, user, job, resume()),
        );

        let results = [first, second];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        let rejected = results
            .into_iter()
            .find_map(Result::err)
            .unwrap();
        assert_eq!(
            rejected.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(application_count(&pool).await, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_inactive_job_is_not_found(pool: PgPool) {
        let (user, job) = seed(&pool, &["java"], false).await;

        let err = submit_application(&pool, &MemoryStorage::default(), user, job, resume())
            .await
            .unwrap_err();

        assert!(matches!(&err, AppError::NotFound(m) if m == "Job not found or inactive"));
        assert_eq!(application_count(&pool).await, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_missing_resume_is_rejected(pool: PgPool) {
        let (user, job) = seed(&pool, &["java"], true).await;

        let err = submit_application(&pool, &MemoryStorage::default(), user, job, None)
            .await
            .unwrap_err();

        assert!(matches!(&err, AppError::Validation(m) if m == "Resume file is required"));
        assert_eq!(application_count(&pool).await, 0);
    }
}
