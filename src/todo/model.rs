//! # Todo Data Model
//!
//! The single managed entity and the normalized write payload that
//! validated requests are turned into.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum title length, in characters, after trimming.
pub const TITLE_MAX_CHARS: usize = 100;

/// Maximum description length, in characters, after trimming.
pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// Todo priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// All accepted priorities, lowest first
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Parse the wire representation. Matching is exact.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == s)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored todo item.
///
/// `id` and `created_at` are assigned by the store on insert and never change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Todo {
    /// Checks the model constraints that must hold for every stored record.
    ///
    /// Stores call this before each write, independently of request validation.
    pub fn check(&self) -> Result<(), String> {
        let title_len = self.title.chars().count();
        if title_len == 0 || title_len > TITLE_MAX_CHARS {
            return Err(format!(
                "title length {} outside 1..={}",
                title_len, TITLE_MAX_CHARS
            ));
        }

        if let Some(description) = &self.description {
            let len = description.chars().count();
            if len > DESCRIPTION_MAX_CHARS {
                return Err(format!(
                    "description length {} exceeds {}",
                    len, DESCRIPTION_MAX_CHARS
                ));
            }
        }

        Ok(())
    }
}

/// Validated and normalized write payload, shared by create and update.
///
/// Strings are already trimmed. `None` means the field was left out of the
/// payload: defaults apply on create and the stored value is kept on update.
#[derive(Debug, Clone, PartialEq)]
pub struct TodoFields {
    pub title: String,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub due_date: Option<DateTime<Utc>>,
}

impl TodoFields {
    /// Fields carrying only a title
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            completed: None,
            priority: None,
            due_date: None,
        }
    }

    /// Builds a new record. `completed` defaults to false.
    pub fn into_todo(self, id: Uuid, created_at: DateTime<Utc>) -> Todo {
        Todo {
            id,
            title: self.title,
            description: self.description,
            completed: self.completed.unwrap_or(false),
            priority: self.priority,
            due_date: self.due_date,
            created_at,
        }
    }

    /// Merges the provided fields into an existing record.
    pub fn apply_to(self, todo: &mut Todo) {
        todo.title = self.title;
        if let Some(description) = self.description {
            todo.description = Some(description);
        }
        if let Some(completed) = self.completed {
            todo.completed = completed;
        }
        if let Some(priority) = self.priority {
            todo.priority = Some(priority);
        }
        if let Some(due_date) = self.due_date {
            todo.due_date = Some(due_date);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Todo {
        TodoFields::titled("Buy milk").into_todo(Uuid::new_v4(), Utc::now())
    }

    #[test]
    fn test_defaults_on_create() {
        let todo = sample();
        assert!(!todo.completed);
        assert!(todo.priority.is_none());
        assert!(todo.description.is_none());
    }

    #[test]
    fn test_wire_names_are_camel_case() {
        let mut todo = sample();
        todo.due_date = Some(Utc::now());
        todo.priority = Some(Priority::High);

        let value = serde_json::to_value(&todo).unwrap();
        assert!(value.get("createdAt").is_some());
        assert!(value.get("dueDate").is_some());
        assert_eq!(value["priority"], json!("high"));
        assert!(value.get("description").is_none());
    }

    #[test]
    fn test_apply_merges_only_given_fields() {
        let mut todo = sample();
        todo.description = Some("two litres".to_string());
        todo.priority = Some(Priority::Low);

        let mut fields = TodoFields::titled("Buy oat milk");
        fields.priority = Some(Priority::High);
        fields.completed = Some(true);
        fields.apply_to(&mut todo);

        assert_eq!(todo.title, "Buy oat milk");
        assert_eq!(todo.description.as_deref(), Some("two litres"));
        assert_eq!(todo.priority, Some(Priority::High));
        assert!(todo.completed);
    }

    #[test]
    fn test_check_rejects_oversized_title() {
        let mut todo = sample();
        assert!(todo.check().is_ok());

        todo.title = "x".repeat(TITLE_MAX_CHARS + 1);
        assert!(todo.check().is_err());

        todo.title = String::new();
        assert!(todo.check().is_err());
    }

    #[test]
    fn test_priority_parse() {
        assert_eq!(Priority::parse("medium"), Some(Priority::Medium));
        assert_eq!(Priority::parse("Medium"), None);
        assert!(Priority::Low < Priority::High);
    }
}
