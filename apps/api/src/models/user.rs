use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// The two roles gating permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Recruiter,
    Applicant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Recruiter => "recruiter",
            Role::Applicant => "applicant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recruiter" => Ok(Role::Recruiter),
            "applicant" => Ok(Role::Applicant),
            other => Err(format!("\"{other}\" is not a valid choice.")),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub about: Option<String>,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    pub portfolio_url: Option<String>,
    pub skills: Value,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub fn role(&self) -> Option<Role> {
        self.role.parse().ok()
    }
}

/// Public profile shape returned by `/auth/me` and candidate lookups.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    pub about: Option<String>,
    pub skills: Value,
    pub portfolio_url: Option<String>,
}

impl From<UserRow> for UserProfile {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            role: row.role,
            full_name: row.full_name,
            phone: row.phone,
            linkedin_url: row.linkedin_url,
            github_url: row.github_url,
            about: row.about,
            skills: row.skills,
            portfolio_url: row.portfolio_url,
        }
    }
}
