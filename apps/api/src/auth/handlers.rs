//! Axum route handlers for accounts: signup, login, refresh, and profile.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::auth::password::{hash_password_blocking, verify_password_blocking};
use crate::auth::tokens::{TokenPair, TokenType};
use crate::auth::AuthUser;
use crate::db::is_unique_violation;
use crate::errors::{field_errors, AppError, FieldErrors};
use crate::models::user::{Role, UserProfile, UserRow};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 150, message = "Username must be 1 to 150 characters."))]
    pub username: String,
    #[serde(default)]
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub password: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 150, message = "Full name must be 1 to 150 characters."))]
    pub full_name: String,
    #[validate(length(max = 20, message = "Ensure this field has no more than 20 characters."))]
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub username: String,
    pub email: String,
    pub role: Role,
    pub full_name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProfileUpdateRequest {
    #[validate(length(min = 1, max = 150, message = "Full name must be 1 to 150 characters."))]
    pub full_name: Option<String>,
    #[validate(length(max = 20, message = "Ensure this field has no more than 20 characters."))]
    pub phone: Option<String>,
    pub about: Option<String>,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    pub portfolio_url: Option<String>,
    pub skills: Option<Vec<String>>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/auth/signup
pub async fn handle_signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), AppError> {
    let mut fields = match req.validate() {
        Ok(()) => FieldErrors::new(),
        Err(e) => field_errors(&e),
    };

    let role = match req.role.parse::<Role>() {
        Ok(role) => Some(role),
        Err(msg) => {
            fields.entry("role".to_string()).or_default().push(msg);
            None
        }
    };

    if !req.username.is_empty() && username_taken(&state, &req.username).await? {
        fields
            .entry("username".to_string())
            .or_default()
            .push("Username already exists.".to_string());
    }
    if !req.email.is_empty() && email_taken(&state, &req.email).await? {
        fields
            .entry("email".to_string())
            .or_default()
            .push("Email already exists.".to_string());
    }

    let role = match role {
        Some(role) if fields.is_empty() => role,
        _ => return Err(AppError::InvalidFields(fields)),
    };

    let password_hash = hash_password_blocking(req.password.clone()).await?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO users (id, username, email, password_hash, role, full_name, phone)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&req.username)
    .bind(&req.email)
    .bind(&password_hash)
    .bind(role.as_str())
    .bind(&req.full_name)
    .bind(&req.phone)
    .execute(&state.db)
    .await;

    // A concurrent signup can still win the race past the existence checks.
    match inserted {
        Ok(_) => {}
        Err(e) if is_unique_violation(&e, Some("users_username_key")) => {
            return Err(AppError::field("username", "Username already exists."))
        }
        Err(e) if is_unique_violation(&e, Some("users_email_key")) => {
            return Err(AppError::field("email", "Email already exists."))
        }
        Err(e) => return Err(e.into()),
    }

    info!("Registered {} {}", role, req.username);

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            username: req.username,
            email: req.email,
            role,
            full_name: req.full_name,
            phone: req.phone,
        }),
    ))
}

/// POST /api/v1/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenPair>, AppError> {
    let invalid =
        || AppError::Unauthorized("No active account found with the given credentials".to_string());

    let user = find_user_by_username(&state, &req.username)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password_blocking(req.password, user.password_hash.clone()).await? {
        return Err(invalid());
    }

    let role = user
        .role()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("user {} has unknown role", user.id)))?;

    Ok(Json(state.tokens.issue_pair(user.id, &user.username, role)?))
}

/// POST /api/v1/auth/refresh
pub async fn handle_refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, AppError> {
    let claims = state.tokens.verify(&req.refresh, TokenType::Refresh)?;

    // Role may have changed and the account may be gone since the refresh was issued.
    let user = find_user_by_id(&state, claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;
    let role = user
        .role()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("user {} has unknown role", user.id)))?;

    let access = state
        .tokens
        .issue(user.id, &user.username, role, TokenType::Access)?;
    Ok(Json(RefreshResponse { access }))
}

/// GET /api/v1/auth/me
pub async fn handle_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<UserProfile>, AppError> {
    let row = find_user_by_id(&state, user.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;
    Ok(Json(row.into()))
}

/// PATCH /api/v1/auth/me
///
/// Partial update. Absent fields are left alone; an empty string clears an
/// optional field.
pub async fn handle_update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<ProfileUpdateRequest>,
) -> Result<Json<Value>, AppError> {
    let mut fields = match req.validate() {
        Ok(()) => FieldErrors::new(),
        Err(e) => field_errors(&e),
    };
    for (name, value) in [
        ("linkedin_url", &req.linkedin_url),
        ("github_url", &req.github_url),
        ("portfolio_url", &req.portfolio_url),
    ] {
        if let Some(url) = value.as_deref().filter(|u| !u.is_empty()) {
            if !validator::validate_url(url) {
                fields
                    .entry(name.to_string())
                    .or_default()
                    .push("Enter a valid URL.".to_string());
            }
        }
    }
    if !fields.is_empty() {
        return Err(AppError::InvalidFields(fields));
    }

    let mut row = find_user_by_id(&state, user.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

    if let Some(full_name) = req.full_name {
        row.full_name = full_name;
    }
    apply_optional(&mut row.phone, req.phone);
    apply_optional(&mut row.about, req.about);
    apply_optional(&mut row.linkedin_url, req.linkedin_url);
    apply_optional(&mut row.github_url, req.github_url);
    apply_optional(&mut row.portfolio_url, req.portfolio_url);
    if let Some(skills) = req.skills {
        row.skills = json!(skills);
    }

    sqlx::query(
        r#"
        UPDATE users
        SET full_name = $1, phone = $2, about = $3, linkedin_url = $4,
            github_url = $5, portfolio_url = $6, skills = $7
        WHERE id = $8
        "#,
    )
    .bind(&row.full_name)
    .bind(&row.phone)
    .bind(&row.about)
    .bind(&row.linkedin_url)
    .bind(&row.github_url)
    .bind(&row.portfolio_url)
    .bind(&row.skills)
    .bind(row.id)
    .execute(&state.db)
    .await?;

    Ok(Json(json!({ "message": "Profile updated successfully" })))
}

/// DELETE /api/v1/auth/me
pub async fn handle_delete_account(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    info!("Deleted user {} and all owned rows", user.id);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/candidates/:username
pub async fn handle_get_candidate(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(username): Path<String>,
) -> Result<Json<UserProfile>, AppError> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT * FROM users WHERE username = $1 AND role = 'applicant'",
    )
    .bind(&username)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Candidate {username} not found")))?;

    Ok(Json(row.into()))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn apply_optional(slot: &mut Option<String>, update: Option<String>) {
    if let Some(value) = update {
        *slot = if value.is_empty() { None } else { Some(value) };
    }
}

async fn username_taken(state: &AppState, username: &str) -> Result<bool, AppError> {
    Ok(
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(&state.db)
            .await?,
    )
}

async fn email_taken(state: &AppState, email: &str) -> Result<bool, AppError> {
    Ok(
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&state.db)
            .await?,
    )
}

async fn find_user_by_username(
    state: &AppState,
    username: &str,
) -> Result<Option<UserRow>, AppError> {
    Ok(
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&state.db)
            .await?,
    )
}

pub(crate) async fn find_user_by_id(
    state: &AppState,
    id: Uuid,
) -> Result<Option<UserRow>, AppError> {
    Ok(sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_optional_semantics() {
        let mut slot = Some("old".to_string());
        apply_optional(&mut slot, None);
        assert_eq!(slot.as_deref(), Some("old"));
        apply_optional(&mut slot, Some("new".to_string()));
        assert_eq!(slot.as_deref(), Some("new"));
        apply_optional(&mut slot, Some(String::new()));
        assert_eq!(slot, None);
    }

    #[test]
    fn test_signup_request_validation_reports_fields() {
        let req = SignupRequest {
            username: String::new(),
            email: "not-an-email".to_string(),
            password: "pw".to_string(),
            role: "recruiter".to_string(),
            full_name: "Ada".to_string(),
            phone: None,
        };
        let fields = field_errors(&req.validate().unwrap_err());
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
        assert!(!fields.contains_key("password"));
    }
}
