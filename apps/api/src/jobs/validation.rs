use serde::{Deserialize, Deserializer};
use validator::Validate;

use crate::errors::{field_errors, AppError};
use crate::models::job::JobRow;

const MAX_KEYWORD_LEN: usize = 50;

/// Full job body, used for create and as the merged result of an update.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct JobPayload {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters."))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub description: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "Company name must be 1 to 255 characters."))]
    pub company_name: String,
    #[serde(default)]
    pub requirements: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "At least one keyword is required."))]
    pub keywords: Vec<String>,
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "Location must be 1 to 255 characters."))]
    pub location: String,
    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 255,
        message = "Experience required must be 1 to 255 characters."
    ))]
    pub experience_required: String,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
}

/// Partial update body. `null` clears a salary bound; an absent field is unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct JobPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub company_name: Option<String>,
    pub requirements: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub location: Option<String>,
    pub experience_required: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub salary_min: Option<Option<i32>>,
    #[serde(default, deserialize_with = "present")]
    pub salary_max: Option<Option<i32>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl JobPayload {
    /// Field rules plus the cross-field checks; trims keywords in place.
    pub fn validated(mut self) -> Result<Self, AppError> {
        self.keywords = self
            .keywords
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();

        let mut fields = match self.validate() {
            Ok(()) => Default::default(),
            Err(e) => field_errors(&e),
        };

        if self.keywords.iter().any(|k| k.chars().count() > MAX_KEYWORD_LEN) {
            fields
                .entry("keywords".to_string())
                .or_default()
                .push(format!("Each keyword must be at most {MAX_KEYWORD_LEN} characters."));
        }

        if let (Some(min), Some(max)) = (self.salary_min, self.salary_max) {
            if min > max {
                fields
                    .entry("non_field_errors".to_string())
                    .or_default()
                    .push("Minimum salary cannot be greater than maximum salary.".to_string());
            }
        }

        if fields.is_empty() {
            Ok(self)
        } else {
            Err(AppError::InvalidFields(fields))
        }
    }

    /// Applies a patch on top of the stored job.
    pub fn merged(row: &JobRow, patch: JobPatch) -> Self {
        Self {
            title: patch.title.unwrap_or_else(|| row.title.clone()),
            description: patch.description.unwrap_or_else(|| row.description.clone()),
            company_name: patch.company_name.unwrap_or_else(|| row.company_name.clone()),
            requirements: patch.requirements.unwrap_or_else(|| row.requirements.clone()),
            keywords: patch.keywords.unwrap_or_else(|| row.keywords.clone()),
            location: patch.location.unwrap_or_else(|| row.location.clone()),
            experience_required: patch
                .experience_required
                .unwrap_or_else(|| row.experience_required.clone()),
            salary_min: patch.salary_min.unwrap_or(row.salary_min),
            salary_max: patch.salary_max.unwrap_or(row.salary_max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::sample_job;
    use serde_json::json;

    fn payload() -> JobPayload {
        serde_json::from_value(json!({
            "title": "Backend Engineer",
            "description": "Build APIs",
            "company_name": "Acme",
            "keywords": ["rust", " sql "],
            "location": "Remote",
            "experience_required": "3",
            "salary_min": 100,
            "salary_max": 200
        }))
        .unwrap()
    }

    fn fields_of(err: AppError) -> crate::errors::FieldErrors {
        match err {
            AppError::InvalidFields(fields) => fields,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_valid_payload_trims_keywords() {
        let job = payload().validated().unwrap();
        assert_eq!(job.keywords, vec!["rust".to_string(), "sql".to_string()]);
    }

    #[test]
    fn test_empty_keywords_rejected() {
        let mut p = payload();
        p.keywords = vec!["  ".to_string()];
        let fields = fields_of(p.validated().unwrap_err());
        assert_eq!(fields["keywords"], vec!["At least one keyword is required.".to_string()]);
    }

    #[test]
    fn test_salary_order_enforced() {
        let mut p = payload();
        p.salary_min = Some(300);
        let fields = fields_of(p.validated().unwrap_err());
        assert!(fields.contains_key("non_field_errors"));
    }

    #[test]
    fn test_single_salary_bound_is_fine() {
        let mut p = payload();
        p.salary_max = None;
        assert!(p.validated().is_ok());
    }

    #[test]
    fn test_missing_fields_reported() {
        let p: JobPayload = serde_json::from_value(json!({ "title": "Only a title" })).unwrap();
        let fields = fields_of(p.validated().unwrap_err());
        for name in ["description", "company_name", "keywords", "location", "experience_required"] {
            assert!(fields.contains_key(name), "missing {name}");
        }
    }

    #[test]
    fn test_patch_distinguishes_null_from_absent() {
        let row = sample_job(&["rust"]);

        let absent: JobPatch = serde_json::from_value(json!({ "title": "New" })).unwrap();
        let merged = JobPayload::merged(&row, absent);
        assert_eq!(merged.title, "New");
        assert_eq!(merged.salary_min, row.salary_min);

        let cleared: JobPatch = serde_json::from_value(json!({ "salary_min": null })).unwrap();
        let merged = JobPayload::merged(&row, cleared);
        assert_eq!(merged.salary_min, None);
        assert_eq!(merged.title, row.title);
    }

    #[test]
    fn test_patch_revalidates_merged_salary() {
        let row = sample_job(&["rust"]);
        let patch: JobPatch = serde_json::from_value(json!({ "salary_min": 1_000_000 })).unwrap();
        assert!(JobPayload::merged(&row, patch).validated().is_err());
    }
}
