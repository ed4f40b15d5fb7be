//! Ephemeral, UI-agnostic view state. Nothing here is part of the store;
//! front ends own these records and commit through [`crate::TaskStore`].

pub mod edit;
pub mod form;

pub use edit::{EditSession, EditSessions, RowMode};
pub use form::{FormField, TaskForm};
