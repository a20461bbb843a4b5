//! Contact details and whole-resume validation.

use serde::{Deserialize, Serialize};

use crate::entries::models::{EntryRecord, EntryType};
use crate::entries::schema::schema_for;
use crate::validation::{is_valid_email, require, FieldErrors};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeDocument {
    #[serde(default)]
    pub contact_info: ContactInfo,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub skills: String,
    #[serde(default)]
    pub experience: Vec<EntryRecord>,
    #[serde(default)]
    pub education: Vec<EntryRecord>,
    #[serde(default)]
    pub projects: Vec<EntryRecord>,
}

pub fn validate_contact(contact: &ContactInfo) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    if !is_valid_email(contact.email.trim()) {
        errors.add("email", "Invalid email address");
    }
    errors.into_result(())
}

/// Validates the resume as a whole. Committed entries are turned back into
/// drafts and checked against their section's schema, so a record whose
/// display dates no longer parse is reported under its own index.
pub fn validate_resume(resume: &ResumeDocument) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    if let Err(contact) = validate_contact(&resume.contact_info) {
        errors.merge_prefixed("contactInfo", contact);
    }
    require(
        &mut errors,
        "summary",
        &resume.summary,
        "Professional summary is required",
    );
    require(&mut errors, "skills", &resume.skills, "Skills are required");

    let sections = [
        ("experience", EntryType::Experience, &resume.experience),
        ("education", EntryType::Education, &resume.education),
        ("projects", EntryType::Project, &resume.projects),
    ];
    for (section, entry_type, records) in sections {
        let schema = schema_for(entry_type);
        for (index, record) in records.iter().enumerate() {
            if let Err(entry_errors) = schema.validate(&record.to_draft()) {
                errors.merge_prefixed(&format!("{section}[{index}]"), entry_errors);
            }
        }
    }

    errors.into_result(())
}
