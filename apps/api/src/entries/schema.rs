//! Schema registry: per-type validation, default values and labels for
//! entry forms.
//!
//! Validation is composed in a fixed order:
//! 1. base rules shared by every type
//! 2. the type's extension rules
//! 3. the end-date refinement (`current` OR non-empty `endDate`)
//!
//! All three write into one `FieldErrors`; the first message per field wins.

use serde::Serialize;

use crate::entries::dates::{YearMonth, PRESENT};
use crate::entries::models::{EntryDetails, EntryDraft, EntryRecord, EntryType, Field};
use crate::validation::{is_valid_gpa, is_valid_url, require, FieldErrors};

const SHARED_FIELDS: [Field; 6] = [
    Field::Title,
    Field::Organization,
    Field::StartDate,
    Field::EndDate,
    Field::Current,
    Field::Description,
];

const EXPERIENCE_FIELDS: &[Field] = &SHARED_FIELDS;

const EDUCATION_FIELDS: &[Field] = &[
    Field::Title,
    Field::Organization,
    Field::StartDate,
    Field::EndDate,
    Field::Current,
    Field::Description,
    Field::Degree,
    Field::Gpa,
];

const PROJECT_FIELDS: &[Field] = &[
    Field::Title,
    Field::Organization,
    Field::StartDate,
    Field::EndDate,
    Field::Current,
    Field::Description,
    Field::ProjectUrl,
    Field::Technologies,
];

/// Validation rules for one entry type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntrySchema {
    entry_type: EntryType,
}

/// A draft that passed its schema, with dates already parsed.
#[derive(Debug, Clone)]
pub struct ValidEntry {
    draft: EntryDraft,
    start: YearMonth,
    /// `None` for current entries.
    end: Option<YearMonth>,
}

impl EntrySchema {
    pub fn fields(&self) -> &'static [Field] {
        match self.entry_type {
            EntryType::Experience => EXPERIENCE_FIELDS,
            EntryType::Education => EDUCATION_FIELDS,
            EntryType::Project => PROJECT_FIELDS,
        }
    }

    pub fn has_field(&self, field: Field) -> bool {
        self.fields().contains(&field)
    }

    pub fn validate(&self, draft: &EntryDraft) -> Result<ValidEntry, FieldErrors> {
        let mut errors = FieldErrors::new();

        if draft.entry_type() != self.entry_type {
            errors.add(
                "type",
                format!("Expected an entry of type {}", self.entry_type),
            );
        }

        let (start, end) = base_rules(draft, &mut errors);
        self.extension_rules(draft, &mut errors);
        end_date_refinement(draft, &mut errors);

        match start {
            Some(start) if errors.is_empty() => Ok(ValidEntry {
                draft: draft.clone(),
                start,
                end,
            }),
            _ => Err(errors),
        }
    }

    fn extension_rules(&self, draft: &EntryDraft, errors: &mut FieldErrors) {
        match (&self.entry_type, &draft.details) {
            (EntryType::Experience, _) => {
                require(
                    errors,
                    Field::Organization.as_str(),
                    &draft.organization,
                    "Company/Organization is required",
                );
            }
            (EntryType::Education, details) => {
                require(
                    errors,
                    Field::Organization.as_str(),
                    &draft.organization,
                    "School/University is required",
                );
                if let EntryDetails::Education { gpa, .. } = details {
                    if !gpa.is_empty() && !is_valid_gpa(gpa) {
                        errors.add(
                            Field::Gpa.as_str(),
                            "GPA must be in a valid format (e.g., 3.5, 4.0)",
                        );
                    }
                }
            }
            (EntryType::Project, details) => {
                if let EntryDetails::Project { project_url, .. } = details {
                    if !project_url.is_empty() && !is_valid_url(project_url) {
                        errors.add(Field::ProjectUrl.as_str(), "Project URL must be a valid URL");
                    }
                }
            }
        }
    }
}

fn base_rules(
    draft: &EntryDraft,
    errors: &mut FieldErrors,
) -> (Option<YearMonth>, Option<YearMonth>) {
    require(errors, Field::Title.as_str(), &draft.title, "Title is required");
    require(
        errors,
        Field::Description.as_str(),
        &draft.description,
        "Description is required",
    );

    let start = if require(
        errors,
        Field::StartDate.as_str(),
        &draft.start_date,
        "Start date is required",
    ) {
        parse_month(
            errors,
            Field::StartDate,
            &draft.start_date,
            "Start date must be in YYYY-MM format",
        )
    } else {
        None
    };

    let end = if !draft.current && !draft.end_date.is_empty() {
        parse_month(
            errors,
            Field::EndDate,
            &draft.end_date,
            "End date must be in YYYY-MM format",
        )
    } else {
        None
    };

    (start, end)
}

fn parse_month(
    errors: &mut FieldErrors,
    field: Field,
    value: &str,
    message: &str,
) -> Option<YearMonth> {
    match YearMonth::parse(value.trim()) {
        Ok(ym) => Some(ym),
        Err(_) => {
            errors.add(field.as_str(), message);
            None
        }
    }
}

fn end_date_refinement(draft: &EntryDraft, errors: &mut FieldErrors) {
    if !draft.current && draft.end_date.trim().is_empty() {
        errors.add(
            Field::EndDate.as_str(),
            "End date is required unless this is current",
        );
    }
}

impl ValidEntry {
    /// Display-ready record: dates as `"Mon YYYY"`, `"Present"` for
    /// current entries.
    pub fn into_record(self) -> EntryRecord {
        let end_date = match self.end {
            Some(end) if !self.draft.current => end.display(),
            _ => PRESENT.to_string(),
        };

        EntryRecord {
            title: self.draft.title,
            organization: self.draft.organization,
            start_date: self.start.display(),
            end_date,
            current: self.draft.current,
            description: self.draft.description,
            details: self.draft.details,
        }
    }
}

pub fn schema_for(entry_type: EntryType) -> EntrySchema {
    EntrySchema { entry_type }
}

pub fn defaults_for(entry_type: EntryType) -> EntryDraft {
    EntryDraft {
        title: String::new(),
        organization: String::new(),
        start_date: String::new(),
        end_date: String::new(),
        current: false,
        description: String::new(),
        details: EntryDetails::empty(entry_type),
    }
}

/// Display strings for an entry form. Presentational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldLabels {
    pub title: &'static str,
    pub organization: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary: Option<&'static str>,
    pub current: &'static str,
    pub description_placeholder: String,
    pub add_button: String,
}

pub fn labels_for(entry_type: EntryType) -> FieldLabels {
    let (title, organization, secondary, current) = match entry_type {
        EntryType::Experience => (
            "Title/Position",
            "Company/Organization",
            None,
            "Current Position",
        ),
        EntryType::Education => (
            "Degree/Certification",
            "School/University",
            Some("GPA/Grade"),
            "Currently Studying",
        ),
        EntryType::Project => (
            "Project Name",
            "Client/Organization (Optional)",
            Some("Technologies Used"),
            "Ongoing Project",
        ),
    };

    FieldLabels {
        title,
        organization,
        secondary,
        current,
        description_placeholder: format!("Description of your {}", entry_type.as_str()),
        add_button: format!("Add {}", entry_type.display_name()),
    }
}
