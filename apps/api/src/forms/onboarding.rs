//! Onboarding profile: industry, specialization, bio, years of experience
//! and a comma-separated skill list.

use serde::{Deserialize, Serialize};

use crate::validation::FieldErrors;

const MAX_BIO_CHARS: usize = 500;
const MAX_EXPERIENCE_YEARS: i64 = 60;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingInput {
    pub industry: Option<String>,
    pub sub_industry: Option<String>,
    pub bio: Option<String>,
    /// Free text from a number input, e.g. "5" or "5 years".
    #[serde(default)]
    pub experience: String,
    #[serde(default)]
    pub skills: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingProfile {
    pub industry: String,
    pub sub_industry: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub experience: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
}

pub fn validate_onboarding(input: &OnboardingInput) -> Result<OnboardingProfile, FieldErrors> {
    let mut errors = FieldErrors::new();

    let industry = non_blank(&input.industry);
    if industry.is_none() {
        errors.add("industry", "Please select an industry");
    }
    let sub_industry = non_blank(&input.sub_industry);
    if sub_industry.is_none() {
        errors.add("subIndustry", "Please select a specialization");
    }

    let bio = non_blank(&input.bio);
    if bio.is_some_and(|b| b.chars().count() > MAX_BIO_CHARS) {
        errors.add(
            "bio",
            format!("Bio must be at most {MAX_BIO_CHARS} characters"),
        );
    }

    let experience = match parse_leading_int(&input.experience) {
        None => {
            errors.add("experience", "Experience must be a number");
            None
        }
        Some(years) if years < 0 => {
            errors.add("experience", "Experience must be at least 0 years");
            None
        }
        Some(years) if years > MAX_EXPERIENCE_YEARS => {
            errors.add("experience", "Experience cannot exceed 60 years");
            None
        }
        Some(years) => u8::try_from(years).ok(),
    };

    match (industry, sub_industry, experience) {
        (Some(industry), Some(sub_industry), Some(experience)) if errors.is_empty() => {
            Ok(OnboardingProfile {
                industry: industry.to_string(),
                sub_industry: sub_industry.to_string(),
                bio: bio.map(str::to_string),
                experience,
                skills: split_skills(&input.skills),
            })
        }
        _ => Err(errors),
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Reads an optionally signed integer prefix, ignoring what follows:
/// `"5 years"` → 5, `"abc"` → None. Oversized runs saturate.
fn parse_leading_int(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let run = &digits[..end];
    if run.is_empty() {
        return None;
    }
    // An all-digit run only fails to parse on overflow; saturate.
    let magnitude = run.parse::<i64>().unwrap_or(i64::MAX);
    Some(sign * magnitude)
}

/// `"Rust, , SQL "` → `["Rust", "SQL"]`; empty input yields `None`.
fn split_skills(input: &str) -> Option<Vec<String>> {
    if input.is_empty() {
        return None;
    }
    Some(
        input
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    )
}
