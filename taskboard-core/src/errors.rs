use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid priority {0:?}: expected High, Medium or Low")]
    InvalidPriority(String),

    #[error("Malformed local task id: {0}")]
    InvalidTaskId(String),
}
