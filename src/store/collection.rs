//! # Todo Collection
//!
//! In-memory documents with their secondary indexes. Shared by every store
//! backend; backends add locking and, for the file store, durability.
//!
//! Each mutating method checks the record constraints before touching any
//! state, so a failed write leaves the collection unchanged.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::Utc;
use uuid::Uuid;

use super::errors::{StoreError, StoreResult};
use super::index::{Seq, TodoIndexes};
use super::query::{SortField, SortOrder, TodoQuery};
use crate::todo::{Priority, Todo, TodoFields};

#[derive(Debug, Clone, Default)]
pub struct Collection {
    /// Documents keyed by insertion sequence
    docs: BTreeMap<Seq, Todo>,
    ids: HashMap<Uuid, Seq>,
    indexes: TodoIndexes,
    next_seq: Seq,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a collection, and its indexes, from records in store order.
    pub fn from_records(records: impl IntoIterator<Item = Todo>) -> StoreResult<Self> {
        let mut collection = Self::new();
        for todo in records {
            collection.insert(todo)?;
        }
        Ok(collection)
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Records in store order
    pub fn records(&self) -> impl Iterator<Item = &Todo> {
        self.docs.values()
    }

    /// Point lookup. Ids that are not UUIDs match nothing.
    pub fn find(&self, id: &str) -> Option<&Todo> {
        let seq = self.seq_of(id)?;
        self.docs.get(&seq)
    }

    /// Assigns an id and creation time, then stores the record.
    pub fn create(&mut self, fields: TodoFields) -> StoreResult<Todo> {
        let mut id = Uuid::new_v4();
        while self.ids.contains_key(&id) {
            id = Uuid::new_v4();
        }
        let todo = fields.into_todo(id, Utc::now());
        self.insert(todo.clone())?;
        Ok(todo)
    }

    /// Merges `fields` into the record with `id` and returns the result.
    pub fn update(&mut self, id: &str, fields: TodoFields) -> StoreResult<Option<Todo>> {
        let Some(seq) = self.seq_of(id) else {
            return Ok(None);
        };
        let mut next = self.docs[&seq].clone();
        fields.apply_to(&mut next);
        self.replace_at(seq, next).map(Some)
    }

    /// Persists a full record over the stored one with the same id.
    ///
    /// `created_at` is kept from the stored record.
    pub fn save(&mut self, todo: &Todo) -> StoreResult<Option<Todo>> {
        let Some(&seq) = self.ids.get(&todo.id) else {
            return Ok(None);
        };
        let mut next = todo.clone();
        next.created_at = self.docs[&seq].created_at;
        self.replace_at(seq, next).map(Some)
    }

    /// Removes and returns the record with `id`.
    pub fn delete(&mut self, id: &str) -> Option<Todo> {
        let seq = self.seq_of(id)?;
        let todo = self.docs.remove(&seq)?;
        self.ids.remove(&todo.id);
        self.indexes.apply_delete(seq, &todo);
        Some(todo)
    }

    /// Runs a list query: index-assisted filtering, then ordering.
    pub fn query(&self, query: &TodoQuery) -> Vec<Todo> {
        let priority = match query.priority.as_deref() {
            Some(raw) => match Priority::parse(raw) {
                Some(p) => Some(p),
                None => return Vec::new(),
            },
            None => None,
        };

        // Candidates from the completion index come out ordered by creation time.
        let (mut seqs, by_created): (Vec<Seq>, bool) = match (query.completed, priority) {
            (Some(completed), Some(priority)) => {
                let wanted: HashSet<Seq> = self.indexes.lookup_priority(priority).collect();
                let seqs: Vec<Seq> = self
                    .indexes
                    .lookup_completed(completed)
                    .filter(|seq| wanted.contains(seq))
                    .collect();
                (seqs, true)
            }
            (Some(completed), None) => (self.indexes.lookup_completed(completed).collect(), true),
            (None, Some(priority)) => (self.indexes.lookup_priority(priority).collect(), false),
            (None, None) => (self.docs.keys().copied().collect(), false),
        };

        let Some(field) = query.sort_field() else {
            seqs.sort_unstable();
            return self.resolve(seqs);
        };

        match field {
            SortField::CreatedAt if by_created => {}
            SortField::DueDate => seqs = self.order_by_due_date(seqs),
            _ => seqs.sort_by(|a, b| {
                field
                    .compare(&self.docs[a], &self.docs[b])
                    .then_with(|| a.cmp(b))
            }),
        }

        if query.order == SortOrder::Desc {
            seqs.reverse();
        }
        self.resolve(seqs)
    }

    /// Records without a due date first, then the due-date index order.
    fn order_by_due_date(&self, mut seqs: Vec<Seq>) -> Vec<Seq> {
        let candidates: HashSet<Seq> = seqs.iter().copied().collect();
        seqs.retain(|seq| self.docs[seq].due_date.is_none());
        seqs.sort_unstable();
        seqs.extend(
            self.indexes
                .scan_due_date()
                .filter(|seq| candidates.contains(seq)),
        );
        seqs
    }

    fn resolve(&self, seqs: Vec<Seq>) -> Vec<Todo> {
        seqs.into_iter()
            .filter_map(|seq| self.docs.get(&seq).cloned())
            .collect()
    }

    fn seq_of(&self, id: &str) -> Option<Seq> {
        let id = Uuid::parse_str(id).ok()?;
        self.ids.get(&id).copied()
    }

    fn insert(&mut self, todo: Todo) -> StoreResult<()> {
        todo.check().map_err(StoreError::Constraint)?;
        if self.ids.contains_key(&todo.id) {
            return Err(StoreError::Constraint(format!("duplicate id {}", todo.id)));
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.indexes.apply_write(seq, &todo);
        self.ids.insert(todo.id, seq);
        self.docs.insert(seq, todo);
        Ok(())
    }

    fn replace_at(&mut self, seq: Seq, next: Todo) -> StoreResult<Todo> {
        next.check().map_err(StoreError::Constraint)?;
        if let Some(previous) = self.docs.insert(seq, next.clone()) {
            self.indexes.apply_delete(seq, &previous);
        }
        self.indexes.apply_write(seq, &next);
        Ok(next)
    }
}
