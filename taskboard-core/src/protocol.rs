use serde::{Deserialize, Serialize};

use crate::models::Priority;

/// Body of `POST /tasks`. The server answers with the stored [`crate::Task`],
/// including its assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub text: String,
    pub priority: Priority,
}

/// Body of `PATCH /tasks/{id}`. Exactly one field is set per request;
/// the response body is ignored, only the status matters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

impl TaskPatch {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            priority: None,
        }
    }

    pub fn priority(priority: Priority) -> Self {
        Self {
            text: None,
            priority: Some(priority),
        }
    }
}
