//! # Record Store
//!
//! The persistence boundary for todo documents. Handlers talk to a
//! [`TodoStore`]; the backend is chosen once at startup from the database URL
//! and passed in explicitly.
//!
//! # Backends
//!
//! - `memory://` - [`MemoryStore`], process-local
//! - `file://<path>` - [`FileStore`], one checksummed collection file

pub mod collection;
pub mod errors;
pub mod file;
pub mod index;
pub mod memory;
pub mod query;

pub use collection::Collection;
pub use errors::{StoreError, StoreResult};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use query::{SortField, SortOrder, TodoQuery};

use std::path::PathBuf;

use crate::todo::{Todo, TodoFields};

/// Todo persistence operations.
///
/// Point operations take the id as sent by the client and return `Ok(None)`
/// when no record matches, including for ids that are not well-formed.
/// Writes are all-or-nothing.
pub trait TodoStore: Send + Sync {
    /// Records matching the query's filters, in its sort order
    fn list(&self, query: &TodoQuery) -> StoreResult<Vec<Todo>>;

    /// Point lookup
    fn find(&self, id: &str) -> StoreResult<Option<Todo>>;

    /// Insert a new record; the store assigns `id` and `createdAt`
    fn insert(&self, fields: TodoFields) -> StoreResult<Todo>;

    /// Merge `fields` into an existing record and return the result
    fn update(&self, id: &str, fields: TodoFields) -> StoreResult<Option<Todo>>;

    /// Write back a full record previously read from the store
    fn save(&self, todo: &Todo) -> StoreResult<Option<Todo>>;

    /// Remove a record, returning it
    fn delete(&self, id: &str) -> StoreResult<Option<Todo>>;
}

impl<S: TodoStore + ?Sized> TodoStore for Box<S> {
    fn list(&self, query: &TodoQuery) -> StoreResult<Vec<Todo>> {
        (**self).list(query)
    }

    fn find(&self, id: &str) -> StoreResult<Option<Todo>> {
        (**self).find(id)
    }

    fn insert(&self, fields: TodoFields) -> StoreResult<Todo> {
        (**self).insert(fields)
    }

    fn update(&self, id: &str, fields: TodoFields) -> StoreResult<Option<Todo>> {
        (**self).update(id, fields)
    }

    fn save(&self, todo: &Todo) -> StoreResult<Option<Todo>> {
        (**self).save(todo)
    }

    fn delete(&self, id: &str) -> StoreResult<Option<Todo>> {
        (**self).delete(id)
    }
}

/// Parsed database URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseUrl {
    Memory,
    File(PathBuf),
}

impl DatabaseUrl {
    pub fn parse(url: &str) -> StoreResult<Self> {
        let url = url.trim();
        if url == "memory" || url == "memory://" {
            return Ok(DatabaseUrl::Memory);
        }
        match url.strip_prefix("file://") {
            Some(path) if !path.is_empty() => Ok(DatabaseUrl::File(PathBuf::from(path))),
            _ => Err(StoreError::UnsupportedUrl(url.to_string())),
        }
    }
}

/// Opens the store named by `database_url`.
pub fn open_store(database_url: &str) -> StoreResult<Box<dyn TodoStore>> {
    match DatabaseUrl::parse(database_url)? {
        DatabaseUrl::Memory => {
            tracing::info!("using in-memory store");
            Ok(Box::new(MemoryStore::new()))
        }
        DatabaseUrl::File(path) => Ok(Box::new(FileStore::open(path)?)),
    }
}

/// Creates an empty collection for `database_url`. Returns the created path,
/// or `None` for backends with nothing to create.
pub fn init_collection(database_url: &str) -> StoreResult<Option<PathBuf>> {
    match DatabaseUrl::parse(database_url)? {
        DatabaseUrl::Memory => Ok(None),
        DatabaseUrl::File(path) => {
            FileStore::init(&path)?;
            Ok(Some(path))
        }
    }
}
