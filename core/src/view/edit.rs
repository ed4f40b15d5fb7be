use std::collections::HashMap;

use tracing::debug;

use crate::error::ValidationError;
use crate::model::task::{Task, TaskId};
use crate::store::TaskStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowMode {
    Display,
    Edit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    pub draft: String,
    error: Option<String>,
}

impl EditSession {
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// In-place text edits, keyed by task id. A row with a session is in edit
/// mode; the store only sees the text once it is committed.
#[derive(Debug, Default)]
pub struct EditSessions {
    sessions: HashMap<TaskId, EditSession>,
}

impl EditSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Completed tasks cannot be edited. Beginning an edit that is already
    /// open keeps its draft.
    pub fn begin(&mut self, task: &Task) -> bool {
        if task.completed {
            return false;
        }
        self.sessions.entry(task.id).or_insert_with(|| EditSession {
            draft: task.text.as_str().to_string(),
            error: None,
        });
        true
    }

    pub fn mode(&self, id: TaskId) -> RowMode {
        if self.sessions.contains_key(&id) {
            RowMode::Edit
        } else {
            RowMode::Display
        }
    }

    pub fn session(&self, id: TaskId) -> Option<&EditSession> {
        self.sessions.get(&id)
    }

    pub fn draft_mut(&mut self, id: TaskId) -> Option<&mut String> {
        self.sessions.get_mut(&id).map(|s| &mut s.draft)
    }

    pub fn error(&self, id: TaskId) -> Option<&str> {
        self.sessions.get(&id).and_then(|s| s.error())
    }

    /// Writes the draft to the store and leaves edit mode. An invalid draft
    /// keeps the row in edit mode with the error recorded.
    ///
    /// Returns `Ok(false)` when the row was not being edited or its task is
    /// gone; a session for a deleted task is dropped without saving.
    pub fn commit(&mut self, id: TaskId, store: &mut TaskStore) -> Result<bool, ValidationError> {
        let Some(session) = self.sessions.get_mut(&id) else {
            return Ok(false);
        };
        match store.update_text(id, &session.draft) {
            Ok(true) => {
                self.sessions.remove(&id);
                debug!(%id, "edit committed");
                Ok(true)
            }
            Ok(false) => {
                self.sessions.remove(&id);
                debug!(%id, "task deleted while editing, draft dropped");
                Ok(false)
            }
            Err(e) => {
                session.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn cancel(&mut self, id: TaskId) -> bool {
        self.sessions.remove(&id).is_some()
    }

    /// Drops sessions whose task no longer exists.
    pub fn retain_existing(&mut self, store: &TaskStore) {
        self.sessions.retain(|id, _| store.get(*id).is_some());
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
