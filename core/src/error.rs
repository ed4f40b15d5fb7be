use thiserror::Error;

/// The only way a write to the store can be refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Task text cannot be empty")]
    EmptyText,
}
