use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::entries::dates::{YearMonth, PRESENT};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown entry type '{0}' (expected experience, education or project)")]
pub struct UnknownEntryType(pub String);

/// The kind of resume line item an editor works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum EntryType {
    Experience,
    Education,
    Project,
}

impl EntryType {
    pub const ALL: [EntryType; 3] = [
        EntryType::Experience,
        EntryType::Education,
        EntryType::Project,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Experience => "experience",
            EntryType::Education => "education",
            EntryType::Project => "project",
        }
    }

    /// Capitalized name used in captions ("Add Education").
    pub fn display_name(&self) -> &'static str {
        match self {
            EntryType::Experience => "Experience",
            EntryType::Education => "Education",
            EntryType::Project => "Project",
        }
    }

    /// Resolves a raw tag from the outside world.
    ///
    /// In lenient mode an unrecognized tag falls back to `Experience`;
    /// in strict mode it is an error.
    pub fn resolve(tag: &str, strict: bool) -> Result<Self, UnknownEntryType> {
        match tag.parse() {
            Ok(entry_type) => Ok(entry_type),
            Err(e) if strict => Err(e),
            Err(_) => {
                warn!("Unknown entry type '{tag}', falling back to experience");
                Ok(EntryType::Experience)
            }
        }
    }
}

impl FromStr for EntryType {
    type Err = UnknownEntryType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "experience" => Ok(EntryType::Experience),
            "education" => Ok(EntryType::Education),
            "project" => Ok(EntryType::Project),
            _ => Err(UnknownEntryType(s.to_string())),
        }
    }
}

impl TryFrom<String> for EntryType {
    type Error = UnknownEntryType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every field an entry form can carry, named as on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Title,
    Organization,
    StartDate,
    EndDate,
    Current,
    Description,
    Degree,
    Gpa,
    ProjectUrl,
    Technologies,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Organization => "organization",
            Field::StartDate => "startDate",
            Field::EndDate => "endDate",
            Field::Current => "current",
            Field::Description => "description",
            Field::Degree => "degree",
            Field::Gpa => "gpa",
            Field::ProjectUrl => "projectUrl",
            Field::Technologies => "technologies",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields only some entry types have. Flattened into drafts and records with
/// a `"type"` tag, so an entry's shape always agrees with its type.
///
/// The tag is read in any case (`"EDUCATION"`) and written lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum EntryDetails {
    Experience,
    Education {
        degree: String,
        gpa: String,
    },
    Project {
        project_url: String,
        technologies: String,
    },
}

/// Wire form of `EntryDetails`: the tag goes through `EntryType`'s
/// case-insensitive parsing, and fields foreign to the tag are ignored.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDetails {
    #[serde(rename = "type")]
    entry_type: EntryType,
    #[serde(default)]
    degree: String,
    #[serde(default)]
    gpa: String,
    #[serde(default)]
    project_url: String,
    #[serde(default)]
    technologies: String,
}

impl<'de> Deserialize<'de> for EntryDetails {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawDetails::deserialize(deserializer)?;
        Ok(match raw.entry_type {
            EntryType::Experience => EntryDetails::Experience,
            EntryType::Education => EntryDetails::Education {
                degree: raw.degree,
                gpa: raw.gpa,
            },
            EntryType::Project => EntryDetails::Project {
                project_url: raw.project_url,
                technologies: raw.technologies,
            },
        })
    }
}

impl EntryDetails {
    pub fn empty(entry_type: EntryType) -> Self {
        match entry_type {
            EntryType::Experience => EntryDetails::Experience,
            EntryType::Education => EntryDetails::Education {
                degree: String::new(),
                gpa: String::new(),
            },
            EntryType::Project => EntryDetails::Project {
                project_url: String::new(),
                technologies: String::new(),
            },
        }
    }

    pub fn entry_type(&self) -> EntryType {
        match self {
            EntryDetails::Experience => EntryType::Experience,
            EntryDetails::Education { .. } => EntryType::Education,
            EntryDetails::Project { .. } => EntryType::Project,
        }
    }

    fn text(&self, field: Field) -> Option<&str> {
        match (self, field) {
            (EntryDetails::Education { degree, .. }, Field::Degree) => Some(degree.as_str()),
            (EntryDetails::Education { gpa, .. }, Field::Gpa) => Some(gpa.as_str()),
            (EntryDetails::Project { project_url, .. }, Field::ProjectUrl) => {
                Some(project_url.as_str())
            }
            (EntryDetails::Project { technologies, .. }, Field::Technologies) => {
                Some(technologies.as_str())
            }
            _ => None,
        }
    }

    fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        match (self, field) {
            (EntryDetails::Education { degree, .. }, Field::Degree) => Some(degree),
            (EntryDetails::Education { gpa, .. }, Field::Gpa) => Some(gpa),
            (EntryDetails::Project { project_url, .. }, Field::ProjectUrl) => Some(project_url),
            (EntryDetails::Project { technologies, .. }, Field::Technologies) => {
                Some(technologies)
            }
            _ => None,
        }
    }
}

/// In-progress form values. Dates are kept as typed, `YYYY-MM`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub current: bool,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub details: EntryDetails,
}

impl EntryDraft {
    pub fn entry_type(&self) -> EntryType {
        self.details.entry_type()
    }

    /// Text value of `field`, or `None` when the field is not text or does
    /// not exist for this entry type.
    pub fn text(&self, field: Field) -> Option<&str> {
        match field {
            Field::Title => Some(self.title.as_str()),
            Field::Organization => Some(self.organization.as_str()),
            Field::StartDate => Some(self.start_date.as_str()),
            Field::EndDate => Some(self.end_date.as_str()),
            Field::Description => Some(self.description.as_str()),
            Field::Current => None,
            other => self.details.text(other),
        }
    }

    pub fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Title => Some(&mut self.title),
            Field::Organization => Some(&mut self.organization),
            Field::StartDate => Some(&mut self.start_date),
            Field::EndDate => Some(&mut self.end_date),
            Field::Description => Some(&mut self.description),
            Field::Current => None,
            other => self.details.text_mut(other),
        }
    }
}

/// A committed entry. Dates are in display form (`"Mar 2021"`) and
/// `end_date` is `"Present"` for current entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryRecord {
    pub title: String,
    #[serde(default)]
    pub organization: String,
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub current: bool,
    pub description: String,
    #[serde(flatten)]
    pub details: EntryDetails,
}

impl EntryRecord {
    pub fn entry_type(&self) -> EntryType {
        self.details.entry_type()
    }

    /// Turns the record back into editable form values. Dates that do not
    /// parse as display dates are carried over untouched so validation can
    /// report them.
    pub fn to_draft(&self) -> EntryDraft {
        let start_date = undisplay(&self.start_date);
        let end_date = if self.current || self.end_date == PRESENT {
            String::new()
        } else {
            undisplay(&self.end_date)
        };

        EntryDraft {
            title: self.title.clone(),
            organization: self.organization.clone(),
            start_date,
            end_date,
            current: self.current || self.end_date == PRESENT,
            description: self.description.clone(),
            details: self.details.clone(),
        }
    }

    pub fn card(&self) -> EntryCard {
        let heading = if self.organization.is_empty() {
            self.title.clone()
        } else {
            format!("{} @ {}", self.title, self.organization)
        };
        let end = if self.current {
            PRESENT
        } else {
            self.end_date.as_str()
        };

        let (secondary, link) = match &self.details {
            EntryDetails::Experience => (None, None),
            EntryDetails::Education { gpa, .. } => {
                ((!gpa.is_empty()).then(|| format!("GPA: {gpa}")), None)
            }
            EntryDetails::Project {
                project_url,
                technologies,
            } => (
                (!technologies.is_empty()).then(|| format!("Technologies: {technologies}")),
                (!project_url.is_empty()).then(|| project_url.clone()),
            ),
        };

        EntryCard {
            heading,
            date_range: format!("{} - {}", self.start_date, end),
            secondary,
            link,
            description: self.description.clone(),
        }
    }
}

fn undisplay(value: &str) -> String {
    YearMonth::from_display(value)
        .map(|ym| ym.to_string())
        .unwrap_or_else(|_| value.to_string())
}

/// Read-only rendering of a committed entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryCard {
    pub heading: String,
    pub date_range: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub description: String,
}
