//! List query: equality filters plus a single sort key.

use std::cmp::Ordering;

use crate::todo::Todo;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Fields a list can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Title,
    Description,
    Completed,
    Priority,
    DueDate,
    CreatedAt,
}

impl SortField {
    /// Resolve a wire field name. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "id" | "_id" => Some(SortField::Id),
            "title" => Some(SortField::Title),
            "description" => Some(SortField::Description),
            "completed" => Some(SortField::Completed),
            "priority" => Some(SortField::Priority),
            "dueDate" => Some(SortField::DueDate),
            "createdAt" => Some(SortField::CreatedAt),
            _ => None,
        }
    }

    /// Ascending comparison of two records on this field. Missing values sort
    /// first. Priorities compare by their stored text, so `high < low < medium`.
    pub fn compare(&self, a: &Todo, b: &Todo) -> Ordering {
        match self {
            SortField::Id => a.id.cmp(&b.id),
            SortField::Title => a.title.cmp(&b.title),
            SortField::Description => a.description.cmp(&b.description),
            SortField::Completed => a.completed.cmp(&b.completed),
            SortField::Priority => a
                .priority
                .map(|p| p.as_str())
                .cmp(&b.priority.map(|p| p.as_str())),
            SortField::DueDate => a.due_date.cmp(&b.due_date),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        }
    }
}

/// Filter and sort for a list request.
///
/// `priority` is kept as the raw requested string: a value that is not a
/// known priority matches no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoQuery {
    pub completed: Option<bool>,
    pub priority: Option<String>,
    pub sort_by: String,
    pub order: SortOrder,
}

impl Default for TodoQuery {
    fn default() -> Self {
        Self {
            completed: None,
            priority: None,
            sort_by: "createdAt".to_string(),
            order: SortOrder::Desc,
        }
    }
}

impl TodoQuery {
    pub fn sort_field(&self) -> Option<SortField> {
        SortField::from_name(&self.sort_by)
    }
}
