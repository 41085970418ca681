// Authentication: JWT issuance, password hashing, and role-gated extractors.

pub mod handlers;
pub mod password;
pub mod tokens;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use uuid::Uuid;

use crate::auth::tokens::TokenType;
use crate::errors::AppError;
use crate::models::user::Role;
use crate::state::AppState;

/// The caller identified by a valid `Authorization: Bearer <access token>` header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Unauthorized("Authentication credentials were not provided".to_string())
            })?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Expected a Bearer token".to_string()))?;

        let claims = state.tokens.verify(token, TokenType::Access)?;

        Ok(AuthUser {
            id: claims.sub,
            username: claims.username,
            role: claims.role,
        })
    }
}

/// An authenticated recruiter; other roles get 403.
#[derive(Debug, Clone)]
pub struct Recruiter(pub AuthUser);

/// An authenticated applicant; other roles get 403.
#[derive(Debug, Clone)]
pub struct Applicant(pub AuthUser);

#[async_trait]
impl FromRequestParts<AppState> for Recruiter {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        require_role(user, Role::Recruiter).map(Recruiter)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Applicant {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        require_role(user, Role::Applicant).map(Applicant)
    }
}

fn require_role(user: AuthUser, role: Role) -> Result<AuthUser, AppError> {
    if user.role == role {
        Ok(user)
    } else {
        Err(AppError::Forbidden(format!(
            "Only {role}s can perform this action"
        )))
    }
}
