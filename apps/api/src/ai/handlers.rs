//! Axum route handler for AI keyword suggestions.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::ai::keywords::postprocess_keywords;
use crate::ai::prompts::{keywords_prompt, KEYWORDS_SYSTEM};
use crate::auth::Recruiter;
use crate::errors::AppError;
use crate::state::AppState;

pub const MAX_DESCRIPTION_CHARS: usize = 2000;

#[derive(Debug, Deserialize)]
pub struct KeywordRequest {
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct KeywordResponse {
    pub keywords: Vec<String>,
}

fn checked_description(raw: &str) -> Result<&str, AppError> {
    let description = raw.trim();
    if description.is_empty() {
        return Err(AppError::Validation("Description is required".to_string()));
    }
    if description.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(AppError::Validation("Description too long".to_string()));
    }
    Ok(description)
}

/// POST /api/v1/ai/job-keywords
///
/// Suggests up to six keywords for a job description.
pub async fn handle_job_keywords(
    State(state): State<AppState>,
    Recruiter(_user): Recruiter,
    Json(request): Json<KeywordRequest>,
) -> Result<Json<KeywordResponse>, AppError> {
    let description = checked_description(&request.description)?;

    let raw = state
        .llm
        .call_text(&keywords_prompt(description), KEYWORDS_SYSTEM)
        .await
        .map_err(|e| AppError::ServiceUnavailable(format!("Keyword generation failed: {e}")))?;

    Ok(Json(KeywordResponse {
        keywords: postprocess_keywords(&raw),
    }))
}
