use chrono::{Local, NaiveDate};
use tracing::debug;

use crate::model::task::{is_valid_text, Priority, TaskId};
use crate::store::TaskStore;
use crate::time::parse_optional_date_from;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Text,
    Deadline,
    Priority,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            FormField::Text => FormField::Deadline,
            FormField::Deadline => FormField::Priority,
            FormField::Priority => FormField::Text,
        }
    }
}

/// Uncommitted input of the creation form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskForm {
    pub text: String,
    /// Raw deadline input, parsed on submit.
    pub deadline: String,
    pub priority: Priority,
    error: Option<String>,
}

impl TaskForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn submit(&mut self, store: &mut TaskStore) -> Option<TaskId> {
        self.submit_on(store, Local::now().date_naive())
    }

    /// Adds the task and clears the form. On failure the input is kept and
    /// [`TaskForm::error`] says why.
    pub fn submit_on(&mut self, store: &mut TaskStore, today: NaiveDate) -> Option<TaskId> {
        if !is_valid_text(&self.text) {
            self.error = Some("Task text cannot be empty".to_string());
            return None;
        }

        let deadline = match parse_optional_date_from(&self.deadline, today) {
            Ok(d) => d,
            Err(_) => {
                self.error = Some(format!("Invalid deadline: '{}'", self.deadline.trim()));
                return None;
            }
        };

        match store.add(&self.text, deadline, self.priority) {
            Ok(id) => {
                debug!(%id, "form submitted");
                self.reset();
                Some(id)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                None
            }
        }
    }
}
