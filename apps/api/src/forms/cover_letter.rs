use serde::{Deserialize, Serialize};

use crate::validation::{require, FieldErrors};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetterRequest {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub job_description: String,
}

pub fn validate_cover_letter(req: &CoverLetterRequest) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    require(
        &mut errors,
        "companyName",
        &req.company_name,
        "Company name is required",
    );
    require(&mut errors, "jobTitle", &req.job_title, "Job title is required");
    require(
        &mut errors,
        "jobDescription",
        &req.job_description,
        "Job description is required",
    );
    errors.into_result(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_fields_required() {
        let errors = validate_cover_letter(&CoverLetterRequest::default()).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get("jobTitle"), Some("Job title is required"));
    }

    #[test]
    fn test_complete_request() {
        let req = CoverLetterRequest {
            company_name: "Acme".into(),
            job_title: "Backend Engineer".into(),
            job_description: "Build APIs in Rust".into(),
        };
        assert!(validate_cover_letter(&req).is_ok());
    }
}
