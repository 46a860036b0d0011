//! File-backed record store
//!
//! The whole collection lives in one file:
//!
//! ```text
//! {"format":"todo-collection","version":1}
//! <crc32 hex> <todo json>
//! <crc32 hex> <todo json>
//! ```
//!
//! Every line after the header is checksummed; a mismatch on load is
//! reported as corruption and never skipped.
//!
//! Writes apply to a copy of the collection, rewrite the file through a
//! temp file (write, fsync, rename, fsync dir) and only then replace the
//! in-memory state. A failed persist leaves both file and memory unchanged.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use super::collection::Collection;
use super::errors::{StoreError, StoreResult};
use super::query::TodoQuery;
use super::TodoStore;
use crate::todo::{Todo, TodoFields};

const FORMAT_NAME: &str = "todo-collection";
const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
struct Header {
    format: String,
    version: u32,
}

impl Header {
    fn current() -> Self {
        Self {
            format: FORMAT_NAME.to_string(),
            version: FORMAT_VERSION,
        }
    }
}

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    data: RwLock<Collection>,
}

impl FileStore {
    /// Opens the collection file at `path`, creating an empty one if missing.
    ///
    /// # Errors
    ///
    /// `StoreError::Io` if the file cannot be read or created,
    /// `StoreError::Corruption` if any line fails verification.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();

        let collection = if path.exists() {
            load(&path)?
        } else {
            let empty = Collection::new();
            persist(&path, &empty)?;
            empty
        };

        tracing::info!(path = %path.display(), count = collection.len(), "opened collection file");

        Ok(Self {
            path,
            data: RwLock::new(collection),
        })
    }

    /// Creates a new, empty collection file. Refuses to overwrite.
    pub fn init(path: impl Into<PathBuf>) -> StoreResult<()> {
        let path = path.into();
        if path.exists() {
            return Err(StoreError::AlreadyInitialized(path));
        }
        persist(&path, &Collection::new())
    }

    fn read<T>(&self, op: impl FnOnce(&Collection) -> T) -> StoreResult<T> {
        let data = self.data.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(op(&data))
    }

    fn write<T>(&self, op: impl FnOnce(&mut Collection) -> StoreResult<T>) -> StoreResult<T> {
        self.write_with(op, fsync_dir)
    }

    /// Applies `op` to a copy, replaces the file with the copy, then
    /// publishes it.
    ///
    /// Once the rename has happened the file holds the new state, so memory
    /// follows it even if syncing the directory afterwards fails.
    fn write_with<T>(
        &self,
        op: impl FnOnce(&mut Collection) -> StoreResult<T>,
        sync_dir: impl FnOnce(&Path) -> StoreResult<()>,
    ) -> StoreResult<T> {
        let mut data = self.data.write().map_err(|_| StoreError::LockPoisoned)?;
        let mut next = data.clone();
        let out = op(&mut next)?;
        let parent = replace_file(&self.path, &next)?;
        *data = next;

        if let Err(e) = sync_dir(&parent) {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "collection file replaced but directory sync failed"
            );
        }
        Ok(out)
    }
}

impl TodoStore for FileStore {
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
        // Skip the rewrite when nothing matches.
        if self.find(id)?.is_none() {
            return Ok(None);
        }
        self.write(|c| Ok(c.delete(id)))
    }
}

fn load(path: &Path) -> StoreResult<Collection> {
    let contents = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    let mut lines = contents.lines().enumerate();

    let header: Header = match lines.next() {
        Some((_, line)) => serde_json::from_str(line).map_err(|e| StoreError::Corruption {
            line: 1,
            reason: format!("unreadable header: {}", e),
        })?,
        None => {
            return Err(StoreError::Corruption {
                line: 1,
                reason: "missing header".to_string(),
            })
        }
    };
    if header != Header::current() {
        return Err(StoreError::Corruption {
            line: 1,
            reason: format!("unsupported format {} v{}", header.format, header.version),
        });
    }

    let mut records = Vec::new();
    for (idx, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        records.push(decode_line(idx + 1, line)?);
    }

    Collection::from_records(records).map_err(|e| StoreError::Corruption {
        line: 0,
        reason: e.to_string(),
    })
}

fn decode_line(line_no: usize, line: &str) -> StoreResult<Todo> {
    let corrupt = |reason: String| StoreError::Corruption {
        line: line_no,
        reason,
    };

    let (checksum, body) = line
        .split_once(' ')
        .ok_or_else(|| corrupt("missing checksum".to_string()))?;
    let expected = u32::from_str_radix(checksum, 16)
        .map_err(|_| corrupt(format!("malformed checksum '{}'", checksum)))?;
    let actual = crc32fast::hash(body.as_bytes());
    if actual != expected {
        return Err(corrupt(format!(
            "checksum mismatch: expected {:08x}, got {:08x}",
            expected, actual
        )));
    }

    serde_json::from_str(body).map_err(|e| corrupt(format!("unreadable record: {}", e)))
}

fn encode(collection: &Collection) -> StoreResult<String> {
    let mut out = serde_json::to_string(&Header::current())?;
    out.push('\n');
    for todo in collection.records() {
        let body = serde_json::to_string(todo)?;
        out.push_str(&format!("{:08x} {}\n", crc32fast::hash(body.as_bytes()), body));
    }
    Ok(out)
}

/// Replaces the collection file and syncs its directory.
fn persist(path: &Path, collection: &Collection) -> StoreResult<()> {
    let parent = replace_file(path, collection)?;
    fsync_dir(&parent)
}

/// Writes `collection` to a temp file, syncs it and renames it over `path`.
/// Returns the directory holding the file.
fn replace_file(path: &Path, collection: &Collection) -> StoreResult<PathBuf> {
    let contents = encode(collection)?;

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(|e| StoreError::io(&parent, e))?;

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = parent.join(tmp_name);

    let written = File::create(&tmp_path)
        .and_then(|mut file| {
            file.write_all(contents.as_bytes())?;
            file.sync_all()
        })
        .and_then(|_| fs::rename(&tmp_path, path));
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(StoreError::io(path, e));
    }

    Ok(parent)
}

#[cfg(unix)]
fn fsync_dir(dir: &Path) -> StoreResult<()> {
    OpenOptions::new()
        .read(true)
        .open(dir)
        .and_then(|d| d.sync_all())
        .map_err(|e| StoreError::io(dir, e))
}

#[cfg(not(unix))]
fn fsync_dir(_dir: &Path) -> StoreResult<()> {
    Ok(())
}
