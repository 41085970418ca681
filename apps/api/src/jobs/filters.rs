//! Public job listing filters, rendered into SQL with bound parameters.

use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};

use crate::errors::AppError;

/// Raw query string of `GET /api/v1/jobs`. Empty values count as absent.
#[derive(Debug, Default, Deserialize)]
pub struct JobListQuery {
    pub page: Option<String>,
    pub search: Option<String>,
    pub location: Option<String>,
    pub exp: Option<String>,
    pub min_salary: Option<String>,
    pub max_salary: Option<String>,
}

#[derive(Debug, Default, PartialEq)]
pub struct JobFilters {
    pub search: Option<String>,
    pub location: Option<String>,
    /// Maximum years of experience the candidate has.
    pub max_experience_years: Option<i64>,
    pub min_salary: Option<i32>,
    pub max_salary: Option<i32>,
}

impl JobFilters {
    pub fn from_query(query: &JobListQuery) -> Result<Self, AppError> {
        let exp = non_empty(&query.exp)
            .map(|raw| {
                leading_integer(raw)
                    .ok_or_else(|| AppError::field("exp", "A valid number of years is required."))
            })
            .transpose()?;

        Ok(Self {
            search: non_empty(&query.search).map(String::from),
            location: non_empty(&query.location).map(String::from),
            max_experience_years: exp,
            min_salary: parse_salary("min_salary", &query.min_salary)?,
            max_salary: parse_salary("max_salary", &query.max_salary)?,
        })
    }

    /// Appends ` AND ...` clauses for every active filter. Expects the builder
    /// to already hold a `WHERE` over `jobs j`.
    pub fn push_conditions(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        if let Some(search) = &self.search {
            let pattern = like_pattern(search);
            qb.push(" AND (j.title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR j.description ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR EXISTS (SELECT 1 FROM unnest(j.keywords) AS kw WHERE kw ILIKE ")
                .push_bind(pattern)
                .push("))");
        }

        if let Some(location) = &self.location {
            qb.push(" AND j.location ILIKE ")
                .push_bind(like_pattern(location));
        }

        if let Some(years) = self.max_experience_years {
            // Free-text requirement; its leading number is the year count, none means 0.
            qb.push(
                r" AND COALESCE(substring(j.experience_required from '^\s*(\d{1,9})')::bigint, 0) <= ",
            )
            .push_bind(years);
        }

        if let Some(min_salary) = self.min_salary {
            qb.push(" AND j.salary_min >= ").push_bind(min_salary);
        }

        if let Some(max_salary) = self.max_salary {
            qb.push(" AND j.salary_max <= ").push_bind(max_salary);
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_salary(name: &str, raw: &Option<String>) -> Result<Option<i32>, AppError> {
    non_empty(raw)
        .map(|s| {
            s.parse::<i32>()
                .map_err(|_| AppError::field(name, "A valid integer is required."))
        })
        .transpose()
}

/// Leading run of ASCII digits, e.g. "3+ years" → 3.
pub fn leading_integer(raw: &str) -> Option<i64> {
    let digits: String = raw
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .take(9)
        .collect();
    digits.parse().ok()
}

/// Case-insensitive "contains" pattern with LIKE wildcards escaped.
pub fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
