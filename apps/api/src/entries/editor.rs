//! Entry editor: the add/edit state machine for one list of one entry type.
//!
//! ```text
//!   Idle ──open_add / open_edit──▶ Composing ──submit (valid)──▶ Idle
//!    ▲                               │  │
//!    └────────────cancel─────────────┘  └─ submit (invalid): stays, errors updated
//! ```
//!
//! The editor never owns the entry list. Transitions that change the list
//! borrow the owner's current list and hand back a full replacement.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::entries::enhancement::{EnhancementError, ImproveRequest};
use crate::entries::models::{EntryCard, EntryDraft, EntryRecord, EntryType, Field};
use crate::entries::schema::{defaults_for, schema_for, EntrySchema};
use crate::validation::FieldErrors;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EditorError {
    #[error("No entry form is open")]
    NotComposing,

    #[error("Finish or cancel the open entry form first")]
    NotIdle,

    #[error("An improvement is already in progress")]
    ImproveInFlight,

    #[error("Please enter a description first")]
    EmptyDescription,

    #[error("Entry {index} does not exist (list has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Field '{field}' does not apply to {entry_type} entries")]
    FieldNotApplicable { field: Field, entry_type: EntryType },

    #[error("Field '{0}' is not a text field")]
    NotTextField(Field),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComposeMode {
    Add,
    Edit { index: usize },
}

/// The open form.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposingForm {
    pub mode: ComposeMode,
    pub draft: EntryDraft,
    pub errors: FieldErrors,
    /// Ticket of the improve request in flight, if any.
    pending_improve: Option<u64>,
    /// Set after the first rejected submit; edits re-validate from then on.
    revalidate: bool,
}

impl ComposingForm {
    fn new(mode: ComposeMode, draft: EntryDraft) -> Self {
        Self {
            mode,
            draft,
            errors: FieldErrors::new(),
            pending_improve: None,
            revalidate: false,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.pending_improve.is_some()
    }

    pub fn can_improve(&self) -> bool {
        !self.is_busy() && !self.draft.description.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditorState {
    Idle,
    Composing(ComposingForm),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Transient message for the user (toast).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The replacement list for the owner. The editor is back to Idle.
    Committed(Vec<EntryRecord>),
    /// The form stays open with these errors attached.
    Rejected(FieldErrors),
}

/// An improve request handed out by `begin_improve`. Its id must be passed
/// back to `finish_improve`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImproveTicket {
    pub id: u64,
    pub request: ImproveRequest,
}

#[derive(Debug, Clone)]
pub struct EntryEditor {
    entry_type: EntryType,
    schema: EntrySchema,
    state: EditorState,
    notice: Option<Notice>,
    next_ticket: u64,
}

impl EntryEditor {
    pub fn new(entry_type: EntryType) -> Self {
        Self {
            entry_type,
            schema: schema_for(entry_type),
            state: EditorState::Idle,
            notice: None,
            next_ticket: 1,
        }
    }

    pub fn entry_type(&self) -> EntryType {
        self.entry_type
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn form(&self) -> Option<&ComposingForm> {
        match &self.state {
            EditorState::Composing(form) => Some(form),
            EditorState::Idle => None,
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Hands the pending notice to the caller; it is shown once.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    pub fn cards(&self, entries: &[EntryRecord]) -> Vec<EntryCard> {
        entries.iter().map(EntryRecord::card).collect()
    }

    pub fn open_add(&mut self) -> Result<(), EditorError> {
        self.ensure_idle()?;
        self.state = EditorState::Composing(ComposingForm::new(
            ComposeMode::Add,
            defaults_for(self.entry_type),
        ));
        debug!("Opened {} form (add)", self.entry_type);
        Ok(())
    }

    pub fn open_edit(&mut self, entries: &[EntryRecord], index: usize) -> Result<(), EditorError> {
        self.ensure_idle()?;
        let record = entries.get(index).ok_or(EditorError::IndexOutOfRange {
            index,
            len: entries.len(),
        })?;
        self.state = EditorState::Composing(ComposingForm::new(
            ComposeMode::Edit { index },
            record.to_draft(),
        ));
        debug!("Opened {} form (edit #{index})", self.entry_type);
        Ok(())
    }

    pub fn set_field(&mut self, field: Field, value: String) -> Result<(), EditorError> {
        if field == Field::Current {
            return Err(EditorError::NotTextField(field));
        }
        let entry_type = self.entry_type;
        let schema = self.schema;
        let form = self.composing_mut()?;

        let slot = form
            .draft
            .text_mut(field)
            .filter(|_| schema.has_field(field))
            .ok_or(EditorError::FieldNotApplicable { field, entry_type })?;
        *slot = value;

        revalidate_if_needed(&schema, form);
        Ok(())
    }

    /// Checking `current` clears `endDate` immediately.
    pub fn set_current(&mut self, current: bool) -> Result<(), EditorError> {
        let schema = self.schema;
        let form = self.composing_mut()?;

        form.draft.current = current;
        if current {
            form.draft.end_date.clear();
        }

        revalidate_if_needed(&schema, form);
        Ok(())
    }

    /// Validates the open form. On success the normalized entry is appended
    /// (or replaces the edited one) in a new list and the editor returns to
    /// Idle.
    pub fn submit(&mut self, entries: &[EntryRecord]) -> Result<SubmitOutcome, EditorError> {
        let schema = self.schema;
        let form = self.composing_mut()?;

        let valid = match schema.validate(&form.draft) {
            Ok(valid) => valid,
            Err(errors) => {
                debug!("Submit rejected: {} field error(s)", errors.len());
                form.errors = errors.clone();
                form.revalidate = true;
                return Ok(SubmitOutcome::Rejected(errors));
            }
        };

        let record = valid.into_record();
        let next = match form.mode {
            ComposeMode::Add => {
                let mut next = entries.to_vec();
                next.push(record);
                next
            }
            ComposeMode::Edit { index } => {
                if index >= entries.len() {
                    return Err(EditorError::IndexOutOfRange {
                        index,
                        len: entries.len(),
                    });
                }
                let mut next = entries.to_vec();
                next[index] = record;
                next
            }
        };

        self.state = EditorState::Idle;
        debug!("Committed {} entry, list now {} long", self.entry_type, next.len());
        Ok(SubmitOutcome::Committed(next))
    }

    pub fn cancel(&mut self) -> Result<(), EditorError> {
        self.composing_mut()?;
        self.state = EditorState::Idle;
        Ok(())
    }

    /// Returns the list without the entry at `index`.
    pub fn delete(
        &self,
        entries: &[EntryRecord],
        index: usize,
    ) -> Result<Vec<EntryRecord>, EditorError> {
        self.ensure_idle()?;
        if index >= entries.len() {
            return Err(EditorError::IndexOutOfRange {
                index,
                len: entries.len(),
            });
        }
        Ok(entries
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, e)| e.clone())
            .collect())
    }

    /// Marks the form busy and returns the request to send to the
    /// enhancement collaborator.
    pub fn begin_improve(&mut self) -> Result<ImproveTicket, EditorError> {
        let entry_type = self.entry_type;
        let id = self.next_ticket;
        let form = self.composing_mut()?;

        if form.is_busy() {
            return Err(EditorError::ImproveInFlight);
        }
        if form.draft.description.trim().is_empty() {
            return Err(EditorError::EmptyDescription);
        }

        form.pending_improve = Some(id);
        let request = ImproveRequest {
            current_text: form.draft.description.clone(),
            entry_type,
        };
        self.next_ticket += 1;
        Ok(ImproveTicket { id, request })
    }

    /// Applies a collaborator result. Clears the busy flag first; a result
    /// for a form that is no longer open is dropped. Returns whether the
    /// result was applied.
    pub fn finish_improve(
        &mut self,
        ticket: u64,
        outcome: Result<String, EnhancementError>,
    ) -> bool {
        let schema = self.schema;
        let form = match &mut self.state {
            EditorState::Composing(form) if form.pending_improve == Some(ticket) => form,
            _ => {
                debug!("Dropping stale improve result #{ticket}");
                return false;
            }
        };
        form.pending_improve = None;

        self.notice = Some(match outcome {
            Ok(text) => {
                form.draft.description = text;
                revalidate_if_needed(&schema, form);
                Notice {
                    level: NoticeLevel::Success,
                    message: "Description improved successfully!".to_string(),
                }
            }
            Err(e) => Notice {
                level: NoticeLevel::Error,
                message: e.to_string(),
            },
        });
        true
    }

    /// Clears the busy flag for a request whose result will never arrive.
    /// The draft is left as it was. Returns whether `ticket` was pending.
    pub fn abandon_improve(&mut self, ticket: u64) -> bool {
        match &mut self.state {
            EditorState::Composing(form) if form.pending_improve == Some(ticket) => {
                form.pending_improve = None;
                debug!("Abandoned improve request #{ticket}");
                true
            }
            _ => false,
        }
    }

    fn ensure_idle(&self) -> Result<(), EditorError> {
        match self.state {
            EditorState::Idle => Ok(()),
            EditorState::Composing(_) => Err(EditorError::NotIdle),
        }
    }

    fn composing_mut(&mut self) -> Result<&mut ComposingForm, EditorError> {
        match &mut self.state {
            EditorState::Composing(form) => Ok(form),
            EditorState::Idle => Err(EditorError::NotComposing),
        }
    }
}

fn revalidate_if_needed(schema: &EntrySchema, form: &mut ComposingForm) {
    if form.revalidate {
        form.errors = schema
            .validate(&form.draft)
            .err()
            .unwrap_or_default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entries::dates::PRESENT;
    use crate::entries::models::EntryDetails;

    fn record(title: &str) -> EntryRecord {
        EntryRecord {
            title: title.to_string(),
            organization: "Acme".into(),
            start_date: "Jan 2020".into(),
            end_date: "Dec 2021".into(),
            current: false,
            description: "Did work".into(),
            details: EntryDetails::Experience,
        }
    }

    fn fill(editor: &mut EntryEditor, fields: &[(Field, &str)]) {
        for (field, value) in fields {
            editor.set_field(*field, value.to_string()).unwrap();
        }
    }

    fn composing_experience() -> EntryEditor {
        let mut editor = EntryEditor::new(EntryType::Experience);
        editor.open_add().unwrap();
        fill(
            &mut editor,
            &[
                (Field::Title, "Engineer"),
                (Field::Organization, "Acme"),
                (Field::StartDate, "2021-03"),
                (Field::EndDate, "2023-01"),
                (Field::Description, "Built stuff"),
            ],
        );
        editor
    }

    #[test]
    fn test_starts_idle() {
        let editor = EntryEditor::new(EntryType::Project);
        assert_eq!(editor.state(), &EditorState::Idle);
        assert!(editor.form().is_none());
    }

    #[test]
    fn test_open_add_uses_type_defaults() {
        let mut editor = EntryEditor::new(EntryType::Education);
        editor.open_add().unwrap();
        let form = editor.form().unwrap();
        assert_eq!(form.mode, ComposeMode::Add);
        assert_eq!(form.draft, defaults_for(EntryType::Education));
        assert!(form.errors.is_empty());
        assert_eq!(editor.open_add(), Err(EditorError::NotIdle));
    }

    #[test]
    fn test_submit_appends_and_returns_to_idle() {
        let mut editor = composing_experience();
        let entries = vec![record("First")];

        let outcome = editor.submit(&entries).unwrap();
        let SubmitOutcome::Committed(next) = outcome else {
            panic!("expected commit");
        };
        assert_eq!(next.len(), 2);
        assert_eq!(next[0], entries[0]);
        assert_eq!(next[1].title, "Engineer");
        assert_eq!(next[1].start_date, "Mar 2021");
        assert_eq!(next[1].end_date, "Jan 2023");
        assert_eq!(editor.state(), &EditorState::Idle);
    }

    #[test]
    fn test_failed_submit_stays_composing_with_errors() {
        let mut editor = EntryEditor::new(EntryType::Experience);
        editor.open_add().unwrap();
        let entries = vec![record("First")];

        let outcome = editor.submit(&entries).unwrap();
        let SubmitOutcome::Rejected(errors) = outcome else {
            panic!("expected rejection");
        };
        assert!(errors.contains("title"));
        assert!(errors.contains("endDate"));
        assert_eq!(editor.form().unwrap().errors, errors);
    }

    #[test]
    fn test_edits_revalidate_after_failed_submit() {
        let mut editor = EntryEditor::new(EntryType::Experience);
        editor.open_add().unwrap();
        editor.submit(&[]).unwrap();
        assert!(editor.form().unwrap().errors.contains("title"));

        editor.set_field(Field::Title, "Engineer".into()).unwrap();
        let errors = &editor.form().unwrap().errors;
        assert!(!errors.contains("title"));
        assert!(errors.contains("organization"));

        editor.set_current(true).unwrap();
        assert!(!editor.form().unwrap().errors.contains("endDate"));
    }

    #[test]
    fn test_edits_do_not_validate_before_first_submit() {
        let mut editor = EntryEditor::new(EntryType::Experience);
        editor.open_add().unwrap();
        editor.set_field(Field::Title, "Engineer".into()).unwrap();
        assert!(editor.form().unwrap().errors.is_empty());
    }

    #[test]
    fn test_current_clears_end_date_and_commits_present() {
        let mut editor = composing_experience();
        editor.set_current(true).unwrap();
        assert_eq!(editor.form().unwrap().draft.end_date, "");

        let SubmitOutcome::Committed(next) = editor.submit(&[]).unwrap() else {
            panic!("expected commit");
        };
        assert_eq!(next[0].end_date, PRESENT);
        assert!(next[0].current);
    }

    #[test]
    fn test_unchecking_current_keeps_end_date_empty() {
        let mut editor = composing_experience();
        editor.set_current(true).unwrap();
        editor.set_current(false).unwrap();
        assert_eq!(editor.form().unwrap().draft.end_date, "");
    }

    #[test]
    fn test_set_field_rejects_fields_of_other_types() {
        let mut editor = composing_experience();
        assert_eq!(
            editor.set_field(Field::Gpa, "3.5".into()),
            Err(EditorError::FieldNotApplicable {
                field: Field::Gpa,
                entry_type: EntryType::Experience
            })
        );
        assert_eq!(
            editor.set_field(Field::Current, "true".into()),
            Err(EditorError::NotTextField(Field::Current))
        );
    }

    #[test]
    fn test_transitions_require_composing() {
        let mut editor = EntryEditor::new(EntryType::Experience);
        assert_eq!(editor.cancel(), Err(EditorError::NotComposing));
        assert_eq!(editor.submit(&[]), Err(EditorError::NotComposing));
        assert_eq!(editor.set_current(true), Err(EditorError::NotComposing));
        assert_eq!(
            editor.begin_improve().unwrap_err(),
            EditorError::NotComposing
        );
    }

    #[test]
    fn test_cancel_discards_draft() {
        let mut editor = composing_experience();
        editor.cancel().unwrap();
        assert_eq!(editor.state(), &EditorState::Idle);

        editor.open_add().unwrap();
        assert_eq!(
            editor.form().unwrap().draft,
            defaults_for(EntryType::Experience)
        );
    }

    #[test]
    fn test_delete_keeps_relative_order() {
        let editor = EntryEditor::new(EntryType::Experience);
        let entries: Vec<_> = ["a", "b", "c", "d"].into_iter().map(record).collect();

        for i in 0..entries.len() {
            let next = editor.delete(&entries, i).unwrap();
            assert_eq!(next.len(), entries.len() - 1);
            let expected: Vec<_> = entries
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, e)| e.title.clone())
                .collect();
            let titles: Vec<_> = next.iter().map(|e| e.title.clone()).collect();
            assert_eq!(titles, expected);
        }
    }

    #[test]
    fn test_delete_out_of_range_and_while_composing() {
        let mut editor = EntryEditor::new(EntryType::Experience);
        let entries = vec![record("a")];
        assert_eq!(
            editor.delete(&entries, 1),
            Err(EditorError::IndexOutOfRange { index: 1, len: 1 })
        );
        editor.open_add().unwrap();
        assert_eq!(editor.delete(&entries, 0), Err(EditorError::NotIdle));
    }

    #[test]
    fn test_edit_replaces_in_place() {
        let mut editor = EntryEditor::new(EntryType::Experience);
        let entries = vec![record("a"), record("b"), record("c")];
        editor.open_edit(&entries, 1).unwrap();

        let form = editor.form().unwrap();
        assert_eq!(form.mode, ComposeMode::Edit { index: 1 });
        assert_eq!(form.draft.start_date, "2020-01");
        assert_eq!(form.draft.end_date, "2021-12");

        editor.set_field(Field::Title, "b2".into()).unwrap();
        let SubmitOutcome::Committed(next) = editor.submit(&entries).unwrap() else {
            panic!("expected commit");
        };
        let titles: Vec<_> = next.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["a", "b2", "c"]);
        assert_eq!(next[1].start_date, "Jan 2020");
    }

    #[test]
    fn test_edit_of_vanished_entry_fails_on_submit() {
        let mut editor = EntryEditor::new(EntryType::Experience);
        let entries = vec![record("a"), record("b")];
        editor.open_edit(&entries, 1).unwrap();
        assert_eq!(
            editor.submit(&entries[..1]),
            Err(EditorError::IndexOutOfRange { index: 1, len: 1 })
        );
        assert!(editor.form().is_some());
    }

    #[test]
    fn test_improve_success_overwrites_description() {
        let mut editor = composing_experience();
        let ticket = editor.begin_improve().unwrap();
        assert_eq!(ticket.request.current_text, "Built stuff");
        assert_eq!(ticket.request.entry_type, EntryType::Experience);
        assert!(editor.form().unwrap().is_busy());
        assert!(!editor.form().unwrap().can_improve());

        let applied = editor.finish_improve(
            ticket.id,
            Ok("Built stuff using scalable architecture".into()),
        );
        assert!(applied);
        let form = editor.form().unwrap();
        assert!(!form.is_busy());
        assert_eq!(
            form.draft.description,
            "Built stuff using scalable architecture"
        );
        assert_eq!(
            editor.take_notice(),
            Some(Notice {
                level: NoticeLevel::Success,
                message: "Description improved successfully!".into()
            })
        );
        assert!(editor.notice().is_none());
    }

    #[test]
    fn test_improve_failure_keeps_description() {
        let mut editor = composing_experience();
        let ticket = editor.begin_improve().unwrap();
        editor.finish_improve(
            ticket.id,
            Err(EnhancementError::Message("Quota exceeded".into())),
        );

        let form = editor.form().unwrap();
        assert!(!form.is_busy());
        assert_eq!(form.draft.description, "Built stuff");
        assert_eq!(
            editor.notice(),
            Some(&Notice {
                level: NoticeLevel::Error,
                message: "Quota exceeded".into()
            })
        );
    }

    #[test]
    fn test_second_improve_while_pending_is_rejected() {
        let mut editor = composing_experience();
        editor.begin_improve().unwrap();
        assert_eq!(
            editor.begin_improve().unwrap_err(),
            EditorError::ImproveInFlight
        );
    }

    #[test]
    fn test_improve_requires_description() {
        let mut editor = EntryEditor::new(EntryType::Project);
        editor.open_add().unwrap();
        assert!(!editor.form().unwrap().can_improve());
        assert_eq!(
            editor.begin_improve().unwrap_err(),
            EditorError::EmptyDescription
        );
        assert!(!editor.form().unwrap().is_busy());
    }

    #[test]
    fn test_fields_stay_editable_while_improving() {
        let mut editor = composing_experience();
        let ticket = editor.begin_improve().unwrap();
        editor.set_field(Field::Title, "Senior Engineer".into()).unwrap();
        editor.finish_improve(ticket.id, Ok("Better".into()));

        let draft = &editor.form().unwrap().draft;
        assert_eq!(draft.title, "Senior Engineer");
        assert_eq!(draft.description, "Better");
    }

    #[test]
    fn test_stale_improve_result_is_dropped() {
        let mut editor = composing_experience();
        let ticket = editor.begin_improve().unwrap();
        editor.cancel().unwrap();
        editor.open_add().unwrap();
        editor
            .set_field(Field::Description, "Fresh".into())
            .unwrap();

        assert!(!editor.finish_improve(ticket.id, Ok("Old rewrite".into())));
        assert_eq!(editor.form().unwrap().draft.description, "Fresh");
        assert!(editor.notice().is_none());
    }

    #[test]
    fn test_abandoned_improve_clears_busy_and_keeps_draft() {
        let mut editor = composing_experience();
        let ticket = editor.begin_improve().unwrap();

        assert!(!editor.abandon_improve(ticket.id + 1));
        assert!(editor.form().unwrap().is_busy());

        assert!(editor.abandon_improve(ticket.id));
        let form = editor.form().unwrap();
        assert!(!form.is_busy());
        assert_eq!(form.draft.description, "Built stuff");
        assert!(editor.notice().is_none());

        // a late result for the abandoned ticket is ignored
        assert!(!editor.finish_improve(ticket.id, Ok("Late".into())));
        assert!(editor.begin_improve().is_ok());
    }

    #[test]
    fn test_cards_render_committed_entries() {
        let editor = EntryEditor::new(EntryType::Experience);
        let cards = editor.cards(&[record("Engineer")]);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].heading, "Engineer @ Acme");
        assert_eq!(cards[0].date_range, "Jan 2020 - Dec 2021");
    }
}
