//! Secondary indexes over the todo collection
//!
//! BTree-backed for deterministic iteration. Every entry ends in the
//! record's insertion sequence, so equal keys iterate in store order.
//!
//! Indexes:
//! - (`completed`, `createdAt`) for the completion filter, pre-sorted by creation time
//! - `priority` for the priority filter
//! - `dueDate` for due-date ordering

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

use crate::todo::{Priority, Todo};

/// Insertion sequence of a record in its collection
pub type Seq = u64;

#[derive(Debug, Clone, Default)]
pub struct TodoIndexes {
    completed_created: BTreeSet<(bool, DateTime<Utc>, Seq)>,
    priority: BTreeMap<Priority, BTreeSet<Seq>>,
    due_date: BTreeSet<(DateTime<Utc>, Seq)>,
}

impl TodoIndexes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a record stored at `seq`
    pub fn apply_write(&mut self, seq: Seq, todo: &Todo) {
        self.completed_created
            .insert((todo.completed, todo.created_at, seq));
        if let Some(priority) = todo.priority {
            self.priority.entry(priority).or_default().insert(seq);
        }
        if let Some(due) = todo.due_date {
            self.due_date.insert((due, seq));
        }
    }

    /// Drop the entries of a record previously indexed at `seq`
    pub fn apply_delete(&mut self, seq: Seq, todo: &Todo) {
        self.completed_created
            .remove(&(todo.completed, todo.created_at, seq));
        if let Some(priority) = todo.priority {
            if let Some(set) = self.priority.get_mut(&priority) {
                set.remove(&seq);
                if set.is_empty() {
                    self.priority.remove(&priority);
                }
            }
        }
        if let Some(due) = todo.due_date {
            self.due_date.remove(&(due, seq));
        }
    }

    /// Records with the given completion flag, oldest first
    pub fn lookup_completed(&self, completed: bool) -> impl Iterator<Item = Seq> + '_ {
        self.completed_created
            .range(
                (completed, DateTime::<Utc>::MIN_UTC, Seq::MIN)
                    ..=(completed, DateTime::<Utc>::MAX_UTC, Seq::MAX),
            )
            .map(|(_, _, seq)| *seq)
    }

    /// Records with the given priority, in store order
    pub fn lookup_priority(&self, priority: Priority) -> impl Iterator<Item = Seq> + '_ {
        self.priority
            .get(&priority)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Records that have a due date, earliest first
    pub fn scan_due_date(&self) -> impl Iterator<Item = Seq> + '_ {
        self.due_date.iter().map(|(_, seq)| *seq)
    }

    /// Total entries in the compound index; equals the collection size.
    pub fn len(&self) -> usize {
        self.completed_created.len()
    }

    pub fn is_empty(&self) -> bool {
        self.completed_created.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::todo::TodoFields;
    use chrono::Duration;
    use uuid::Uuid;

    fn todo(completed: bool, priority: Option<Priority>, age_minutes: i64) -> Todo {
        let mut t = TodoFields::titled("t").into_todo(
            Uuid::new_v4(),
            Utc::now() - Duration::minutes(age_minutes),
        );
        t.completed = completed;
        t.priority = priority;
        t
    }

    #[test]
    fn test_completed_lookup_is_ordered_by_creation() {
        let mut idx = TodoIndexes::new();
        idx.apply_write(1, &todo(true, None, 5));
        idx.apply_write(2, &todo(false, None, 10));
        idx.apply_write(3, &todo(true, None, 30));

        let done: Vec<_> = idx.lookup_completed(true).collect();
        assert_eq!(done, vec![3, 1]);
        let open: Vec<_> = idx.lookup_completed(false).collect();
        assert_eq!(open, vec![2]);
    }

    #[test]
    fn test_delete_removes_all_entries() {
        let mut idx = TodoIndexes::new();
        let mut t = todo(false, Some(Priority::High), 0);
        t.due_date = Some(Utc::now());

        idx.apply_write(7, &t);
        assert_eq!(idx.lookup_priority(Priority::High).count(), 1);
        assert_eq!(idx.scan_due_date().count(), 1);

        idx.apply_delete(7, &t);
        assert!(idx.is_empty());
        assert_eq!(idx.lookup_priority(Priority::High).count(), 0);
        assert_eq!(idx.scan_due_date().count(), 0);
    }
}
