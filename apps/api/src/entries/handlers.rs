//! Axum route handlers for entry schemas and editor sessions.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::entries::editor::SubmitOutcome;
use crate::entries::models::{EntryDraft, EntryRecord, EntryType, Field};
use crate::entries::schema::{defaults_for, labels_for, schema_for, FieldLabels};
use crate::entries::sessions::{EditorSession, ImproveGuard, SessionView};
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDescriptor {
    pub entry_type: EntryType,
    pub fields: &'static [Field],
    pub defaults: EntryDraft,
    pub labels: FieldLabels,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub entry_type: String,
    /// Committed records; tags are resolved like `entry_type`.
    #[serde(default)]
    pub entries: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Text(String),
}

#[derive(Debug, Deserialize)]
pub struct FieldUpdate {
    pub field: Field,
    pub value: FieldValue,
}

#[derive(Debug, Serialize)]
pub struct ClosedSession {
    pub id: Uuid,
    pub entries: Vec<EntryRecord>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/entry-types/:entry_type
pub async fn handle_get_schema(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> Result<Json<SchemaDescriptor>, AppError> {
    let entry_type = EntryType::resolve(&tag, state.config.strict_entry_types)?;
    Ok(Json(SchemaDescriptor {
        entry_type,
        fields: schema_for(entry_type).fields(),
        defaults: defaults_for(entry_type),
        labels: labels_for(entry_type),
    }))
}

/// POST /api/v1/entries/normalize
///
/// Validates one draft against its type's schema and returns the committed,
/// display-ready record. 422 with the field map on failure.
pub async fn handle_normalize(
    State(state): State<AppState>,
    Json(raw): Json<Value>,
) -> Result<Json<EntryRecord>, AppError> {
    let draft: EntryDraft = decode_entry(raw, state.config.strict_entry_types)?;
    let record = schema_for(draft.entry_type())
        .validate(&draft)
        .map_err(AppError::InvalidForm)?
        .into_record();
    Ok(Json(record))
}

/// POST /api/v1/editor/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionView>), AppError> {
    let strict = state.config.strict_entry_types;
    let entry_type = EntryType::resolve(&req.entry_type, strict)?;
    let entries = req
        .entries
        .into_iter()
        .map(|raw| decode_entry::<EntryRecord>(raw, strict))
        .collect::<Result<Vec<_>, _>>()?;

    if let Some((index, entry)) = entries
        .iter()
        .enumerate()
        .find(|(_, e)| e.entry_type() != entry_type)
    {
        return Err(AppError::Validation(format!(
            "Entry {index} is a {} entry, expected {entry_type}",
            entry.entry_type()
        )));
    }

    let view = state
        .sessions
        .insert(EditorSession::new(entry_type, entries))
        .await;
    info!(
        "Opened {} editor session {} with {} entries",
        entry_type,
        view.id,
        view.entries.len()
    );
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/v1/editor/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let view = state.sessions.with_session(id, |s| Ok(s.view())).await?;
    Ok(Json(view))
}

/// DELETE /api/v1/editor/sessions/:id
///
/// Closes the session and hands the final list back to the caller.
pub async fn handle_close_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClosedSession>, AppError> {
    let session = state.sessions.remove(id).await?;
    info!("Closed editor session {id}");
    Ok(Json(ClosedSession {
        id,
        entries: session.entries,
    }))
}

/// POST /api/v1/editor/sessions/:id/compose
pub async fn handle_compose(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    transition(&state, id, |s| Ok(s.editor.open_add()?)).await
}

/// POST /api/v1/editor/sessions/:id/entries/:index/edit
pub async fn handle_edit_entry(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<Json<SessionView>, AppError> {
    transition(&state, id, |s| Ok(s.editor.open_edit(&s.entries, index)?)).await
}

/// DELETE /api/v1/editor/sessions/:id/entries/:index
pub async fn handle_delete_entry(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<Json<SessionView>, AppError> {
    transition(&state, id, |s| {
        let next = s.editor.delete(&s.entries, index)?;
        s.replace_entries(next);
        Ok(())
    })
    .await
}

/// PATCH /api/v1/editor/sessions/:id/draft
pub async fn handle_update_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<FieldUpdate>,
) -> Result<Json<SessionView>, AppError> {
    transition(&state, id, |s| match (update.field, update.value) {
        (Field::Current, FieldValue::Flag(current)) => Ok(s.editor.set_current(current)?),
        (Field::Current, FieldValue::Text(_)) => Err(AppError::Validation(
            "current must be a boolean".to_string(),
        )),
        (field, FieldValue::Text(text)) => Ok(s.editor.set_field(field, text)?),
        (field, FieldValue::Flag(_)) => Err(AppError::Validation(format!(
            "{field} must be a string"
        ))),
    })
    .await
}

/// POST /api/v1/editor/sessions/:id/submit
///
/// A rejected submit is not an HTTP error: the view comes back with the
/// form still open and its field errors attached.
pub async fn handle_submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    transition(&state, id, |s| {
        match s.editor.submit(&s.entries)? {
            SubmitOutcome::Committed(next) => s.replace_entries(next),
            SubmitOutcome::Rejected(_) => {}
        }
        Ok(())
    })
    .await
}

/// POST /api/v1/editor/sessions/:id/cancel
pub async fn handle_cancel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    transition(&state, id, |s| Ok(s.editor.cancel()?)).await
}

/// POST /api/v1/editor/sessions/:id/improve
///
/// The session lock is released while the collaborator runs, so the draft
/// stays editable; the result is applied only if the same form is still open.
/// If this request is dropped first, the guard abandons the ticket.
pub async fn handle_improve(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let ticket = state
        .sessions
        .with_session(id, |s| {
            let ticket = s.editor.begin_improve()?;
            s.touch();
            Ok(ticket)
        })
        .await?;
    let guard = ImproveGuard::new(state.sessions.clone(), id, ticket.id);

    let outcome = state.enhancer.enhance(&ticket.request).await;
    if let Err(e) = &outcome {
        warn!("Improve request #{} for session {id} failed: {e}", ticket.id);
    }

    let view = transition(&state, id, |s| {
        s.editor.finish_improve(ticket.id, outcome);
        Ok(())
    })
    .await;
    guard.disarm();
    view
}

/// Rewrites the `"type"` tag of a raw entry through `EntryType::resolve`,
/// so entry bodies follow the same tag policy as the schema lookup.
pub fn resolve_entry_tag(raw: &mut Value, strict: bool) -> Result<EntryType, AppError> {
    let entry = raw
        .as_object_mut()
        .ok_or_else(|| AppError::Validation("Entry must be a JSON object".to_string()))?;
    let tag = entry.get("type").and_then(Value::as_str).unwrap_or_default();
    let entry_type = EntryType::resolve(tag, strict)?;
    entry.insert(
        "type".to_string(),
        Value::String(entry_type.as_str().to_string()),
    );
    Ok(entry_type)
}

/// Resolves the tag, then decodes the entry into a draft or record.
pub fn decode_entry<T: DeserializeOwned>(mut raw: Value, strict: bool) -> Result<T, AppError> {
    resolve_entry_tag(&mut raw, strict)?;
    serde_json::from_value(raw).map_err(|e| AppError::Validation(format!("Invalid entry: {e}")))
}

/// Applies `f` to the session and returns the resulting view.
async fn transition(
    state: &AppState,
    id: Uuid,
    f: impl FnOnce(&mut EditorSession) -> Result<(), AppError>,
) -> Result<Json<SessionView>, AppError> {
    let view = state
        .sessions
        .with_session(id, |s| {
            f(s)?;
            s.touch();
            Ok(s.view())
        })
        .await?;
    Ok(Json(view))
}
