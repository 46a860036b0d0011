//! In-memory record store. Contents are lost when the process exits.

use std::sync::RwLock;

use super::collection::Collection;
use super::errors::{StoreError, StoreResult};
use super::query::TodoQuery;
use super::TodoStore;
use crate::todo::{Todo, TodoFields};

#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<Collection>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, op: impl FnOnce(&Collection) -> T) -> StoreResult<T> {
        let data = self.data.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(op(&data))
    }

    fn write<T>(&self, op: impl FnOnce(&mut Collection) -> StoreResult<T>) -> StoreResult<T> {
        let mut data = self.data.write().map_err(|_| StoreError::LockPoisoned)?;
        op(&mut data)
    }
}

impl TodoStore for MemoryStore {
    fn list(&self, query: &TodoQuery) -> StoreResult<Vec<Todo>> {
        self.read(|c| c.query(query))
    }

    fn find(&self, id: &str) -> StoreResult<Option<Todo>> {
        self.read(|c| c.find(id).cloned())
    }

    fn insert(&self, fields: TodoFields) -> StoreResult<Todo> {
        self.write(|c| c.create(fields))
    }

    fn update(&self, id: &str, fields: TodoFields) -> StoreResult<Option<Todo>> {
        self.write(|c| c.update(id, fields))
    }

    fn save(&self, todo: &Todo) -> StoreResult<Option<Todo>> {
        self.write(|c| c.save(todo))
    }

    fn delete(&self, id: &str) -> StoreResult<Option<Todo>> {
        self.write(|c| Ok(c.delete(id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_find() {
        let store = MemoryStore::new();
        let created = store.insert(TodoFields::titled("Test")).unwrap();

        let found = store.find(&created.id.to_string()).unwrap();
        assert_eq!(found, Some(created));
    }

    #[test]
    fn test_list_counts() {
        let store = MemoryStore::new();
        store.insert(TodoFields::titled("one")).unwrap();
        store.insert(TodoFields::titled("two")).unwrap();

        let all = store.list(&TodoQuery::default()).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_delete_twice() {
        let store = MemoryStore::new();
        let id = store.insert(TodoFields::titled("gone")).unwrap().id.to_string();

        assert!(store.delete(&id).unwrap().is_some());
        assert!(store.delete(&id).unwrap().is_none());
        assert!(store.find(&id).unwrap().is_none());
    }
}
