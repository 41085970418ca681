//! JWT access/refresh token issuance and verification (HS256).

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::errors::AppError;
use crate::models::user::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub role: Role,
    pub typ: TokenType,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

/// Access + refresh pair returned at login.
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub refresh: String,
    pub access: String,
}

#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding_key: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding_key: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.jwt_secret,
            Duration::minutes(config.access_token_ttl_minutes),
            Duration::hours(config.refresh_token_ttl_hours),
        )
    }

    pub fn issue(
        &self,
        user_id: Uuid,
        username: &str,
        role: Role,
        typ: TokenType,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let ttl = match typ {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        };
        let claims = Claims {
            sub: user_id,
            username: username.to_string(),
            role,
            typ,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("token encoding failed: {e}")))
    }

    pub fn issue_pair(
        &self,
        user_id: Uuid,
        username: &str,
        role: Role,
    ) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            refresh: self.issue(user_id, username, role, TokenType::Refresh)?,
            access: self.issue(user_id, username, role, TokenType::Access)?,
        })
    }

    /// Decodes a token and checks signature, expiry, and token type.
    pub fn verify(&self, token: &str, expected: TokenType) -> Result<Claims, AppError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|_| AppError::Unauthorized("Token is invalid or expired".to_string()))?;

        if claims.typ != expected {
            return Err(AppError::Unauthorized(
                "Token has wrong type".to_string(),
            ));
        }
        Ok(claims)
    }
}
