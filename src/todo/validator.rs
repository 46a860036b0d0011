//! Field validation for todo write payloads
//!
//! Rules are checked independently and every violated field is reported,
//! in declaration order. Create and update share the same rule set, so an
//! update must always carry a valid title.
//!
//! Scalars are read in their text form, so `42` is the title "42" and `1`
//! is a valid `completed`. A key that is present with a `null` value is
//! checked like any other value: it fails the `completed`, `priority` and
//! `dueDate` rules and reads as an empty title or description.
//!
//! The validator never touches the store and does not mutate its input.

use std::borrow::Cow;
use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use regex::{Captures, Regex};
use serde::Serialize;
use serde_json::{Map, Value};

use super::model::{Priority, TodoFields, DESCRIPTION_MAX_CHARS, TITLE_MAX_CHARS};

pub const TITLE_MESSAGE: &str = "Title is required and must be between 1 and 100 characters";
pub const DESCRIPTION_MESSAGE: &str = "Description cannot be more than 500 characters";
pub const COMPLETED_MESSAGE: &str = "Completed must be a boolean value";
pub const PRIORITY_MESSAGE: &str = "Priority must be low, medium, or high";
pub const DUE_DATE_MESSAGE: &str = "Due date must be a valid date";

/// Raw write payload, as parsed from a JSON or form body
pub type Payload = Map<String, Value>;

/// A single field-level violation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldViolation {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    pub msg: &'static str,
    pub path: &'static str,
    pub location: &'static str,
}

impl FieldViolation {
    fn body_field(path: &'static str, value: Option<&Value>, msg: &'static str) -> Self {
        Self {
            kind: "field",
            value: value.cloned(),
            msg,
            path,
            location: "body",
        }
    }
}

/// Validates a payload and normalizes it into [`TodoFields`].
///
/// # Errors
///
/// Returns the non-empty list of violations when any rule fails.
pub fn validate_todo(payload: &Payload) -> Result<TodoFields, Vec<FieldViolation>> {
    let mut violations = Vec::new();

    let title = check_title(payload.get("title"));
    if title.is_none() {
        violations.push(FieldViolation::body_field("title", payload.get("title"), TITLE_MESSAGE));
    }

    let description = optional(payload.get("description"), |v| {
        let text = text_of(v)?;
        let text = text.trim();
        (text.chars().count() <= DESCRIPTION_MAX_CHARS).then(|| text.to_string())
    });
    if description.is_none() {
        violations.push(FieldViolation::body_field(
            "description",
            payload.get("description"),
            DESCRIPTION_MESSAGE,
        ));
    }

    let completed = optional(payload.get("completed"), parse_bool);
    if completed.is_none() {
        violations.push(FieldViolation::body_field(
            "completed",
            payload.get("completed"),
            COMPLETED_MESSAGE,
        ));
    }

    let priority = optional(payload.get("priority"), |v| v.as_str().and_then(Priority::parse));
    if priority.is_none() {
        violations.push(FieldViolation::body_field(
            "priority",
            payload.get("priority"),
            PRIORITY_MESSAGE,
        ));
    }

    let due_date = optional(payload.get("dueDate"), |v| match v {
        Value::String(_) | Value::Number(_) => parse_date_time(&text_of(v)?),
        _ => None,
    });
    if due_date.is_none() {
        violations.push(FieldViolation::body_field(
            "dueDate",
            payload.get("dueDate"),
            DUE_DATE_MESSAGE,
        ));
    }

    match (title, description, completed, priority, due_date) {
        (Some(title), Some(description), Some(completed), Some(priority), Some(due_date))
            if violations.is_empty() =>
        {
            Ok(TodoFields {
                title,
                description,
                completed,
                priority,
                due_date,
            })
        }
        _ => Err(violations),
    }
}

fn check_title(value: Option<&Value>) -> Option<String> {
    let text = text_of(value?)?;
    let title = text.trim();
    let len = title.chars().count();
    (1..=TITLE_MAX_CHARS).contains(&len).then(|| title.to_string())
}

/// Text form of a scalar. `null` reads as empty; arrays and objects have none.
fn text_of(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s)),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
        Value::Null => Some(Cow::Borrowed("")),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Runs `parse` on a present value. The outer `None` means the value was
/// rejected; `Some(None)` means the key was left out.
fn optional<T>(value: Option<&Value>, parse: impl FnOnce(&Value) -> Option<T>) -> Option<Option<T>> {
    match value {
        None => Some(None),
        Some(v) => parse(v).map(Some),
    }
}

/// Booleans, plus `0`/`1` and the string forms that form bodies carry.
fn parse_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(_) | Value::Number(_) => match text_of(value)?.as_ref() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn iso8601() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^(?P<year>\d{4})(?:-(?P<month>\d{2})(?:-(?P<day>\d{2})(?:[T\s](?P<hour>\d{2})(?::(?P<minute>\d{2})(?::(?P<second>\d{2})(?:[.,](?P<fraction>\d+))?)?)?(?P<offset>[zZ]|[+-]\d{2}(?::?\d{2})?)?)?)?)?$",
        )
        .expect("ISO-8601 pattern is valid")
    })
}

/// Parses an ISO-8601 calendar date or date-time, as precise as the year
/// alone. Omitted parts default to the start of the period; values without
/// an offset are taken as UTC. Surrounding whitespace is not accepted.
pub fn parse_date_time(s: &str) -> Option<DateTime<Utc>> {
    let caps = iso8601().captures(s)?;
    let number = |name: &str, default: u32| -> Option<u32> {
        match caps.name(name) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(default),
        }
    };

    let date = NaiveDate::from_ymd_opt(
        caps.name("year")?.as_str().parse().ok()?,
        number("month", 1)?,
        number("day", 1)?,
    )?;
    let time = NaiveTime::from_hms_nano_opt(
        number("hour", 0)?,
        number("minute", 0)?,
        number("second", 0)?,
        fraction_nanos(&caps)?,
    )?;

    let offset = utc_offset(caps.name("offset").map(|m| m.as_str()))?;
    let local = date.and_time(time);
    offset
        .from_local_datetime(&local)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Fractional seconds, truncated to nanoseconds.
fn fraction_nanos(caps: &Captures<'_>) -> Option<u32> {
    let Some(fraction) = caps.name("fraction") else {
        return Some(0);
    };
    let digits: String = fraction.as_str().chars().chain(std::iter::repeat('0')).take(9).collect();
    digits.parse().ok()
}

fn utc_offset(raw: Option<&str>) -> Option<FixedOffset> {
    let raw = match raw {
        None | Some("Z") | Some("z") => return FixedOffset::east_opt(0),
        Some(raw) => raw,
    };
    let sign = if raw.starts_with('-') { -1 } else { 1 };
    let digits: String = raw[1..].chars().filter(char::is_ascii_digit).collect();
    let hours: i32 = digits.get(..2)?.parse().ok()?;
    let minutes: i32 = match digits.get(2..) {
        Some("") | None => 0,
        Some(m) => m.parse().ok()?,
    };
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    fn payload(value: Value) -> Payload {
        value.as_object().cloned().unwrap()
    }

    fn paths(violations: &[FieldViolation]) -> Vec<&'static str> {
        violations.iter().map(|v| v.path).collect()
    }

    #[test]
    fn test_minimal_payload_accepted() {
        let fields = validate_todo(&payload(json!({"title": "  Buy milk  "}))).unwrap();
        assert_eq!(fields.title, "Buy milk");
        assert_eq!(fields.completed, None);
        assert_eq!(fields.priority, None);
    }

    #[test]
    fn test_full_payload_accepted() {
        let fields = validate_todo(&payload(json!({
            "title": "Ship release",
            "description": " notes ",
            "completed": true,
            "priority": "high",
            "dueDate": "2025-03-01T12:30:00Z"
        })))
        .unwrap();

        assert_eq!(fields.description.as_deref(), Some("notes"));
        assert_eq!(fields.completed, Some(true));
        assert_eq!(fields.priority, Some(Priority::High));
        assert_eq!(fields.due_date.map(|dt| dt.hour()), Some(12));
    }

    #[test]
    fn test_missing_title_rejected() {
        let errors = validate_todo(&payload(json!({}))).unwrap_err();
        assert_eq!(paths(&errors), vec!["title"]);
        assert_eq!(errors[0].msg, TITLE_MESSAGE);
        assert!(errors[0].value.is_none());
    }

    #[test]
    fn test_blank_and_long_titles_rejected() {
        let errors = validate_todo(&payload(json!({"title": "   "}))).unwrap_err();
        assert_eq!(paths(&errors), vec!["title"]);

        let errors = validate_todo(&payload(json!({"title": ""}))).unwrap_err();
        assert_eq!(errors[0].value, Some(json!("")));

        let long = "a".repeat(101);
        let errors = validate_todo(&payload(json!({"title": long}))).unwrap_err();
        assert_eq!(paths(&errors), vec!["title"]);

        let exact = "é".repeat(100);
        assert!(validate_todo(&payload(json!({"title": exact}))).is_ok());
    }

    #[test]
    fn test_all_violations_reported_together() {
        let errors = validate_todo(&payload(json!({
            "description": "d".repeat(501),
            "completed": "yes",
            "priority": "urgent",
            "dueDate": "not a date"
        })))
        .unwrap_err();

        assert_eq!(
            paths(&errors),
            vec!["title", "description", "completed", "priority", "dueDate"]
        );
    }

    #[test]
    fn test_boolean_forms() {
        let fields = validate_todo(&payload(json!({"title": "t", "completed": "false"}))).unwrap();
        assert_eq!(fields.completed, Some(false));

        let fields = validate_todo(&payload(json!({"title": "t", "completed": "1"}))).unwrap();
        assert_eq!(fields.completed, Some(true));

        let fields = validate_todo(&payload(json!({"title": "t", "completed": 1}))).unwrap();
        assert_eq!(fields.completed, Some(true));

        let fields = validate_todo(&payload(json!({"title": "t", "completed": 0}))).unwrap();
        assert_eq!(fields.completed, Some(false));

        for bad in [json!(2), json!("yes"), json!([true])] {
            let errors = validate_todo(&payload(json!({"title": "t", "completed": bad}))).unwrap_err();
            assert_eq!(paths(&errors), vec!["completed"]);
        }
    }

    #[test]
    fn test_numeric_text_fields_read_as_text() {
        let fields = validate_todo(&payload(json!({"title": 42, "description": 7.5}))).unwrap();
        assert_eq!(fields.title, "42");
        assert_eq!(fields.description.as_deref(), Some("7.5"));

        let errors = validate_todo(&payload(json!({"title": {"text": "x"}}))).unwrap_err();
        assert_eq!(paths(&errors), vec!["title"]);
    }

    #[test]
    fn test_present_null_is_checked() {
        let errors = validate_todo(&payload(json!({
            "title": "t",
            "completed": null,
            "priority": null,
            "dueDate": null
        })))
        .unwrap_err();
        assert_eq!(paths(&errors), vec!["completed", "priority", "dueDate"]);
        assert_eq!(errors[0].value, Some(Value::Null));

        let errors = validate_todo(&payload(json!({"title": null}))).unwrap_err();
        assert_eq!(paths(&errors), vec!["title"]);

        let fields = validate_todo(&payload(json!({"title": "t", "description": null}))).unwrap();
        assert_eq!(fields.description.as_deref(), Some(""));
    }

    #[test]
    fn test_date_formats() {
        let dt = parse_date_time("2024-02-29").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 2, 29));

        let dt = parse_date_time("2024").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 1, 1));

        let dt = parse_date_time("2024-06").unwrap();
        assert_eq!((dt.month(), dt.day()), (6, 1));

        let dt = parse_date_time("2024-06-01 10:00:00").unwrap();
        assert_eq!((dt.day(), dt.hour()), (1, 10));

        let dt = parse_date_time("2024-06-01T08:15:00.250").unwrap();
        assert_eq!(dt.timestamp_subsec_millis(), 250);

        let dt = parse_date_time("2024-06-01T08:15:00+02:00").unwrap();
        assert_eq!(dt.hour(), 6);

        let dt = parse_date_time("2024-06-01T08:15-0130").unwrap();
        assert_eq!((dt.hour(), dt.minute()), (9, 45));

        assert!(parse_date_time("2024-06-01T08Z").is_some());
        assert!(parse_date_time("2023-02-29").is_none());
        assert!(parse_date_time("2024-13").is_none());
        assert!(parse_date_time(" 2024-06-01").is_none());
        assert!(parse_date_time("2024-06-01Z").is_none());
        assert!(parse_date_time("tomorrow").is_none());
    }

    #[test]
    fn test_due_date_accepts_year_number() {
        let fields = validate_todo(&payload(json!({"title": "t", "dueDate": 2024}))).unwrap();
        assert_eq!(fields.due_date.map(|dt| dt.year()), Some(2024));

        let errors = validate_todo(&payload(json!({"title": "t", "dueDate": true}))).unwrap_err();
        assert_eq!(paths(&errors), vec!["dueDate"]);
    }
}
