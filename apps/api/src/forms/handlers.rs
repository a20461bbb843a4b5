//! Stateless validation endpoints for the non-entry forms.
//! Failures come back as 422 with the field map.

use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::entries::handlers::resolve_entry_tag;
use crate::errors::AppError;
use crate::forms::cover_letter::{validate_cover_letter, CoverLetterRequest};
use crate::forms::onboarding::{validate_onboarding, OnboardingInput, OnboardingProfile};
use crate::forms::resume::{validate_contact, validate_resume, ContactInfo, ResumeDocument};
use crate::state::AppState;
use crate::validation::FieldErrors;

const ENTRY_SECTIONS: [&str; 3] = ["experience", "education", "projects"];

#[derive(Debug, Serialize)]
pub struct Accepted<T> {
    pub valid: bool,
    pub value: T,
}

impl<T> Accepted<T> {
    fn new(value: T) -> Json<Self> {
        Json(Self { valid: true, value })
    }
}

fn rejected(form: &str, errors: FieldErrors) -> AppError {
    debug!("Rejected {form} form: {errors}");
    AppError::InvalidForm(errors)
}

/// POST /api/v1/onboarding/validate
pub async fn handle_validate_onboarding(
    Json(input): Json<OnboardingInput>,
) -> Result<Json<Accepted<OnboardingProfile>>, AppError> {
    let profile = validate_onboarding(&input).map_err(|e| rejected("onboarding", e))?;
    Ok(Accepted::new(profile))
}

/// POST /api/v1/contact/validate
pub async fn handle_validate_contact(
    Json(contact): Json<ContactInfo>,
) -> Result<Json<Accepted<ContactInfo>>, AppError> {
    validate_contact(&contact).map_err(|e| rejected("contact", e))?;
    Ok(Accepted::new(contact))
}

/// POST /api/v1/resumes/validate
///
/// Entry tags in the three sections are resolved before decoding, with the
/// same case and unknown-tag handling as the editor endpoints.
pub async fn handle_validate_resume(
    State(state): State<AppState>,
    Json(mut raw): Json<Value>,
) -> Result<Json<Accepted<ResumeDocument>>, AppError> {
    for section in ENTRY_SECTIONS {
        if let Some(Value::Array(entries)) = raw.get_mut(section) {
            for entry in entries {
                resolve_entry_tag(entry, state.config.strict_entry_types)?;
            }
        }
    }
    let resume: ResumeDocument = serde_json::from_value(raw)
        .map_err(|e| AppError::Validation(format!("Invalid resume: {e}")))?;
    validate_resume(&resume).map_err(|e| rejected("resume", e))?;
    Ok(Accepted::new(resume))
}

/// POST /api/v1/cover-letters/validate
pub async fn handle_validate_cover_letter(
    Json(req): Json<CoverLetterRequest>,
) -> Result<Json<Accepted<CoverLetterRequest>>, AppError> {
    validate_cover_letter(&req).map_err(|e| rejected("cover letter", e))?;
    Ok(Accepted::new(req))
}
