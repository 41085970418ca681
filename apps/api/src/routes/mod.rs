pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};

use crate::ai::handlers as ai;
use crate::applications::handlers as applications;
use crate::auth::handlers as auth;
use crate::dashboard::handlers as dashboard;
use crate::jobs::handlers as jobs;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let max_resume_bytes = state.config.max_resume_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Accounts
        .route("/api/v1/auth/signup", post(auth::handle_signup))
        .route("/api/v1/auth/login", post(auth::handle_login))
        .route("/api/v1/auth/refresh", post(auth::handle_refresh))
        .route(
            "/api/v1/auth/me",
            get(auth::handle_me)
                .patch(auth::handle_update_profile)
                .delete(auth::handle_delete_account),
        )
        .route(
            "/api/v1/auth/candidates/:username",
            get(auth::handle_get_candidate),
        )
        // Jobs
        .route(
            "/api/v1/jobs",
            get(jobs::handle_list_jobs).post(jobs::handle_create_job),
        )
        .route("/api/v1/jobs/me", get(jobs::handle_my_jobs))
        .route(
            "/api/v1/jobs/:job_id",
            get(jobs::handle_get_job)
                .patch(jobs::handle_update_job)
                .delete(jobs::handle_delete_job),
        )
        .route(
            "/api/v1/jobs/:job_id/activate",
            patch(jobs::handle_activate_job),
        )
        .route(
            "/api/v1/jobs/:job_id/deactivate",
            patch(jobs::handle_deactivate_job),
        )
        // Applications
        .route(
            "/api/v1/applications/mine",
            get(applications::handle_my_applications),
        )
        .route(
            "/api/v1/applications/:job_id/apply",
            post(applications::handle_apply).layer(DefaultBodyLimit::max(max_resume_bytes)),
        )
        .route(
            "/api/v1/applications/:job_id/applicants",
            get(applications::handle_job_applicants),
        )
        // Dashboards
        .route(
            "/api/v1/dashboard/recruiter/summary",
            get(dashboard::handle_recruiter_summary),
        )
        .route(
            "/api/v1/dashboard/applicant/applications",
            get(dashboard::handle_applicant_history),
        )
        // AI
        .route("/api/v1/ai/job-keywords", post(ai::handle_job_keywords))
        .with_state(state)
}
