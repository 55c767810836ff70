use taskboard_core::{TaskId, ValidationError};
use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Remote unreachable: {0}")]
    Remote(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("No task selected")]
    NoSelection,

    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("Missing configuration: {0} is not set")]
    MissingConfig(&'static str),
}
