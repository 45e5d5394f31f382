// Task record and its identifier

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Unique identifier of a task within a store
///
/// Serialized as a plain JSON string. Numeric ids (millisecond timestamps
/// written by earlier versions of the web app) are accepted on load and kept
/// as their decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => TaskId(s),
            RawId::Signed(n) => TaskId(n.to_string()),
            RawId::Unsigned(n) => TaskId(n.to_string()),
        })
    }
}

/// A single to-do item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    /// Stored as entered; only the emptiness check trims
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Create an uncompleted task
    pub fn new(id: TaskId, text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
            created_at,
        }
    }

    /// True when the text is empty or whitespace-only
    pub fn is_blank(text: &str) -> bool {
        text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Task {
        Task::new(
            TaskId::new("task-1"),
            "Buy milk",
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_task_new_defaults() {
        let task = sample();
        assert_eq!(task.id.as_str(), "task-1");
        assert_eq!(task.text, "Buy milk");
        assert!(!task.completed);
    }

    #[test]
    fn test_task_serialization_uses_camel_case() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.contains("\"id\":\"task-1\""));
        assert!(json.contains("\"completed\":false"));
        assert!(json.contains("\"createdAt\":\"2024-03-01T12:00:00Z\""));
        assert!(!json.contains("created_at"));
    }

    #[test]
    fn test_task_deserializes_numeric_id() {
        let json = r#"{"id":1709294400000,"text":"Legacy","completed":true,"createdAt":"2024-03-01T12:00:00.000Z"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, TaskId::new("1709294400000"));
        assert_eq!(task.text, "Legacy");
        assert!(task.completed);
        assert_eq!(task.created_at, Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_task_completed_defaults_to_false() {
        let json = r#"{"id":"a","text":"No flag","createdAt":"2024-03-01T12:00:00Z"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert!(!task.completed);
    }

    #[test]
    fn test_is_blank() {
        assert!(Task::is_blank(""));
        assert!(Task::is_blank("   "));
        assert!(Task::is_blank("\t\n"));
        assert!(!Task::is_blank(" x "));
    }

    #[test]
    fn test_task_id_display() {
        assert_eq!(TaskId::from("abc").to_string(), "abc");
        assert_eq!(TaskId::from("abc".to_string()), TaskId::new("abc"));
    }
}
