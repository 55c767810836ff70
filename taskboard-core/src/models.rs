use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::errors::ValidationError;

/// Reserved marker distinguishing client-assigned ids from server ids.
/// Nothing the server hands out is allowed to look like this.
pub const LOCAL_ID_PREFIX: &str = "local_";

/// Identity of a task: either assigned by the remote service, or assigned
/// by this client for a task the server has never acknowledged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TaskId {
    /// Opaque id from the remote service.
    Server(String),
    /// Client-assigned id carrying the `local_` marker on the wire.
    Local(Uuid),
}

impl TaskId {
    pub fn new_local() -> Self {
        TaskId::Local(Uuid::new_v4())
    }

    /// True for tasks the server has never seen. Sync logic uses this to
    /// decide whether a network call makes sense at all.
    pub fn is_local(&self) -> bool {
        matches!(self, TaskId::Local(_))
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::Server(id) => f.write_str(id),
            TaskId::Local(id) => write!(f, "{LOCAL_ID_PREFIX}{id}"),
        }
    }
}

impl FromStr for TaskId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix(LOCAL_ID_PREFIX) {
            Some(rest) => Uuid::parse_str(rest)
                .map(TaskId::Local)
                .map_err(|_| ValidationError::InvalidTaskId(s.to_string())),
            None => Ok(TaskId::Server(s.to_string())),
        }
    }
}

impl Serialize for TaskId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // Remote services assign either string or numeric ids; both are opaque here.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(i64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
            Raw::Number(n) => Ok(TaskId::Server(n.to_string())),
        }
    }
}

/// The three priority buckets. A closed enumeration: the only way a UI
/// string becomes a `Priority` is through [`Priority::parse`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
pub enum Priority {
    #[default]
    High,
    Medium,
    Low,
}

impl Priority {
    /// Bucket order used for display grouping.
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        input
            .parse()
            .map_err(|_| ValidationError::InvalidPriority(input.to_string()))
    }
}

/// A single to-do entry. The wire field for the id is `_id`, matching the
/// remote service's convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "_id")]
    pub id: TaskId,
    pub text: String,
    pub priority: Priority,
}

impl Task {
    /// A task created on this client, carrying a fresh local id until the
    /// server acknowledges it (if it ever does).
    pub fn new_local(text: impl Into<String>, priority: Priority) -> Self {
        Self {
            id: TaskId::new_local(),
            text: text.into(),
            priority,
        }
    }
}

/// Whether the remote service is currently believed reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Connectivity {
    Online,
    Offline,
}

impl Connectivity {
    pub fn is_online(self) -> bool {
        matches!(self, Connectivity::Online)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_priority_parse() {
        assert_eq!(Priority::parse("High").unwrap(), Priority::High);
        assert_eq!(Priority::parse("Medium").unwrap(), Priority::Medium);
        assert_eq!(Priority::parse("Low").unwrap(), Priority::Low);

        let err = Priority::parse("Urgent").unwrap_err();
        assert_eq!(err, ValidationError::InvalidPriority("Urgent".to_string()));

        // Case matters: the UI vocabulary is exactly High/Medium/Low.
        assert!(Priority::parse("high").is_err());
        assert!(Priority::parse("").is_err());
    }

    #[test]
    fn test_task_id_display_roundtrip() {
        let local = TaskId::new_local();
        let shown = local.to_string();
        assert!(shown.starts_with(LOCAL_ID_PREFIX));
        assert_eq!(shown.parse::<TaskId>().unwrap(), local);

        let server = TaskId::Server("6650f2a9c1d4".to_string());
        assert_eq!(server.to_string(), "6650f2a9c1d4");
        assert_eq!("6650f2a9c1d4".parse::<TaskId>().unwrap(), server);
    }

    #[test]
    fn test_task_id_rejects_malformed_local_marker() {
        let err = "local_not-a-uuid".parse::<TaskId>().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidTaskId(_)));
    }

    #[test]
    fn test_task_id_deserializes_numeric_server_ids() {
        let id: TaskId = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(id, TaskId::Server("42".to_string()));
    }

    #[test]
    fn test_task_wire_format_uses_underscore_id() {
        let task = Task {
            id: TaskId::Server("srv1".to_string()),
            text: "Buy milk".to_string(),
            priority: Priority::Low,
        };

        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(
            value,
            json!({"_id": "srv1", "text": "Buy milk", "priority": "Low"})
        );

        let parsed: Task = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, task);
    }

    #[test]
    fn test_task_deserialization_ignores_extra_fields() {
        // Real services tack on bookkeeping fields (__v and friends).
        let parsed: Task = serde_json::from_value(json!({
            "_id": "srv2",
            "text": "Walk the dog",
            "priority": "Medium",
            "__v": 0
        }))
        .unwrap();
        assert_eq!(parsed.priority, Priority::Medium);
    }

    #[test]
    fn test_local_task_survives_snapshot_roundtrip() {
        let task = Task::new_local("Offline entry", Priority::High);
        let json = serde_json::to_string(&task).unwrap();
        let parsed: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, task);
        assert!(parsed.id.is_local());
    }
}
