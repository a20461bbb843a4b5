//! In-memory editor sessions. A session is the owner of one entry list: it
//! lends the list to its editor and stores whatever replacement comes back.
//!
//! Sessions that see no transition for the store's idle TTL are evicted,
//! on insert and by a periodic sweeper.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::entries::editor::{ComposeMode, EditorState, EntryEditor, Notice};
use crate::entries::models::{EntryCard, EntryDraft, EntryRecord, EntryType};
use crate::entries::schema::{labels_for, FieldLabels};
use crate::errors::AppError;
use crate::validation::FieldErrors;

/// How often the background sweeper looks for idle sessions.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

pub struct EditorSession {
    pub id: Uuid,
    pub entries: Vec<EntryRecord>,
    pub editor: EntryEditor,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    last_active: Instant,
}

impl EditorSession {
    pub fn new(entry_type: EntryType, entries: Vec<EntryRecord>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            entries,
            editor: EntryEditor::new(entry_type),
            created_at: now,
            updated_at: now,
            last_active: Instant::now(),
        }
    }

    /// Swaps in the list an editor transition produced.
    pub fn replace_entries(&mut self, entries: Vec<EntryRecord>) {
        self.entries = entries;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
        self.last_active = Instant::now();
    }

    fn is_idle_for(&self, ttl: Duration) -> bool {
        self.last_active.elapsed() >= ttl
    }

    /// Snapshot for the client. Consumes the pending notice.
    pub fn view(&mut self) -> SessionView {
        let entry_type = self.editor.entry_type();
        let (state, form) = match self.editor.state() {
            EditorState::Idle => (EditorStateName::Idle, None),
            EditorState::Composing(form) => (
                EditorStateName::Composing,
                Some(FormView {
                    mode: form.mode,
                    draft: form.draft.clone(),
                    errors: form.errors.clone(),
                    busy: form.is_busy(),
                    can_improve: form.can_improve(),
                }),
            ),
        };

        SessionView {
            id: self.id,
            entry_type,
            state,
            cards: self.editor.cards(&self.entries),
            entries: self.entries.clone(),
            form,
            labels: labels_for(entry_type),
            notice: self.editor.take_notice(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorStateName {
    Idle,
    Composing,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormView {
    pub mode: ComposeMode,
    pub draft: EntryDraft,
    pub errors: FieldErrors,
    pub busy: bool,
    pub can_improve: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: Uuid,
    pub entry_type: EntryType,
    pub state: EditorStateName,
    pub entries: Vec<EntryRecord>,
    pub cards: Vec<EntryCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<FormView>,
    pub labels: FieldLabels,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

type SessionMap = HashMap<Uuid, EditorSession>;

/// Shared session map. Locks are held only for the synchronous part of a
/// transition, never across an await on the enhancement collaborator.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<SessionMap>>,
    idle_ttl: Duration,
}

impl SessionStore {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            idle_ttl,
        }
    }

    pub async fn insert(&self, mut session: EditorSession) -> SessionView {
        let view = session.view();
        let mut sessions = self.inner.write().await;
        evict_idle(&mut sessions, self.idle_ttl);
        sessions.insert(session.id, session);
        view
    }

    /// Runs `f` against the session under the write lock.
    pub async fn with_session<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut EditorSession) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut sessions = self.inner.write().await;
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Editor session {id} not found")))?;
        f(session)
    }

    pub async fn remove(&self, id: Uuid) -> Result<EditorSession, AppError> {
        self.inner
            .write()
            .await
            .remove(&id)
            .ok_or_else(|| AppError::NotFound(format!("Editor session {id} not found")))
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Drops every session idle for at least the TTL. Returns how many went.
    pub async fn evict_idle(&self) -> usize {
        evict_idle(&mut *self.inner.write().await, self.idle_ttl)
    }

    /// Runs `evict_idle` every `period` until the runtime shuts down.
    pub fn spawn_sweeper(&self, period: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                store.evict_idle().await;
            }
        })
    }
}

fn evict_idle(sessions: &mut SessionMap, ttl: Duration) -> usize {
    let before = sessions.len();
    sessions.retain(|id, session| {
        let keep = !session.is_idle_for(ttl);
        if !keep {
            debug!("Evicting idle editor session {id}");
        }
        keep
    });
    let evicted = before - sessions.len();
    if evicted > 0 {
        info!("Evicted {evicted} idle editor session(s), {} open", sessions.len());
    }
    evicted
}

/// Owns an improve ticket while its request is out with the collaborator.
/// If the request is dropped before the result is applied, the ticket is
/// abandoned so the form does not stay busy.
pub struct ImproveGuard {
    store: SessionStore,
    session_id: Uuid,
    ticket: Option<u64>,
}

impl ImproveGuard {
    pub fn new(store: SessionStore, session_id: Uuid, ticket: u64) -> Self {
        Self {
            store,
            session_id,
            ticket: Some(ticket),
        }
    }

    /// The result was applied; nothing to clean up.
    pub fn disarm(mut self) {
        self.ticket = None;
    }
}

impl Drop for ImproveGuard {
    fn drop(&mut self) {
        let Some(ticket) = self.ticket.take() else {
            return;
        };
        let id = self.session_id;
        warn!("Improve request #{ticket} for session {id} ended before its result was applied");

        if let Ok(mut sessions) = self.store.inner.try_write() {
            if let Some(session) = sessions.get_mut(&id) {
                session.editor.abandon_improve(ticket);
            }
            return;
        }

        // Lock is busy: finish the cleanup on the runtime.
        let store = self.store.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    let released = store
                        .with_session(id, |s| Ok(s.editor.abandon_improve(ticket)))
                        .await;
                    if let Err(e) = released {
                        debug!("Could not release improve request #{ticket}: {e}");
                    }
                });
            }
            Err(_) => warn!("No runtime to release improve request #{ticket} for session {id}"),
        }
    }
}
