//! File Store Durability Tests
//!
//! Tests that:
//! - Acknowledged writes survive a reopen
//! - A rejected write leaves file and memory untouched
//! - Corrupted lines fail the open instead of being skipped
//! - `init` refuses to overwrite an existing collection

use std::fs;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use todo_api::http_server::{build_router, RunMode};
use todo_api::store::{init_collection, open_store, FileStore, StoreError, TodoQuery, TodoStore};
use todo_api::todo::{Priority, TodoFields};

// =============================================================================
// Test Utilities
// =============================================================================

fn create_temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

fn fields(title: &str, priority: Option<Priority>) -> TodoFields {
    let mut f = TodoFields::titled(title);
    f.priority = priority;
    f
}

// =============================================================================
// Persistence across reopen
// =============================================================================

#[test]
fn test_writes_survive_reopen() {
    let dir = create_temp_dir();
    let path = dir.path().join("todos.db");

    let (kept, removed) = {
        let store = FileStore::open(&path).unwrap();
        let kept = store.insert(fields("Buy milk", Some(Priority::High))).unwrap();
        let removed = store.insert(fields("Throw away", None)).unwrap();

        let mut toggled = kept.clone();
        toggled.completed = true;
        store.save(&toggled).unwrap();
        store.delete(&removed.id.to_string()).unwrap();
        (toggled, removed)
    };

    let store = FileStore::open(&path).unwrap();
    let all = store.list(&TodoQuery::default()).unwrap();
    assert_eq!(all, vec![kept.clone()]);
    assert!(store.find(&removed.id.to_string()).unwrap().is_none());

    let query = TodoQuery {
        priority: Some("high".to_string()),
        ..TodoQuery::default()
    };
    assert_eq!(store.list(&query).unwrap().len(), 1, "indexes rebuilt on open");
}

#[tokio::test]
async fn test_http_writes_persist_through_database_url() {
    let dir = create_temp_dir();
    let url = format!("file://{}", dir.path().join("todos.db").display());

    let created: Value = {
        let app = build_router(open_store(&url).unwrap(), RunMode::Production);
        let request = Request::builder()
            .method("POST")
            .uri("/api/todos")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({"title": "Persist me"}).to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice::<Value>(&bytes).unwrap()["data"].clone()
    };

    let app = build_router(open_store(&url).unwrap(), RunMode::Production);
    let id = created["id"].as_str().unwrap();
    let request = Request::builder()
        .uri(format!("/api/todos/{}", id))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["data"], created);
}

// =============================================================================
// Rejected writes
// =============================================================================

#[test]
fn test_rejected_write_leaves_file_unchanged() {
    let dir = create_temp_dir();
    let path = dir.path().join("todos.db");
    let store = FileStore::open(&path).unwrap();
    let original = store.insert(fields("Short title", None)).unwrap();
    let before = fs::read(&path).unwrap();

    let mut oversized = original.clone();
    oversized.title = "x".repeat(101);
    let result = store.save(&oversized);

    assert!(matches!(result, Err(StoreError::Constraint(_))));
    assert_eq!(fs::read(&path).unwrap(), before);
    assert_eq!(
        store.find(&original.id.to_string()).unwrap(),
        Some(original)
    );
}

#[test]
fn test_delete_of_unknown_id_does_not_rewrite() {
    let dir = create_temp_dir();
    let path = dir.path().join("todos.db");
    let store = FileStore::open(&path).unwrap();
    store.insert(fields("Stay", None)).unwrap();
    let before = fs::read(&path).unwrap();

    assert!(store.delete("not-a-uuid").unwrap().is_none());
    assert_eq!(fs::read(&path).unwrap(), before);
}

// =============================================================================
// Corruption detection
// =============================================================================

#[test]
fn test_corrupted_record_fails_open() {
    let dir = create_temp_dir();
    let path = dir.path().join("todos.db");
    {
        let store = FileStore::open(&path).unwrap();
        store.insert(fields("Buy milk", None)).unwrap();
    }

    let contents = fs::read_to_string(&path).unwrap();
    fs::write(&path, contents.replace("Buy milk", "Buy malk")).unwrap();

    match FileStore::open(&path) {
        Err(StoreError::Corruption { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected corruption error, got {:?}", other),
    }
}

#[test]
fn test_truncated_record_fails_open() {
    let dir = create_temp_dir();
    let path = dir.path().join("todos.db");
    {
        let store = FileStore::open(&path).unwrap();
        store.insert(fields("Buy milk", None)).unwrap();
    }

    let contents = fs::read_to_string(&path).unwrap();
    let cut = contents.trim_end().len() - 5;
    fs::write(&path, &contents[..cut]).unwrap();

    assert!(matches!(
        FileStore::open(&path),
        Err(StoreError::Corruption { .. })
    ));
}

// =============================================================================
// Initialization
// =============================================================================

#[test]
fn test_init_creates_then_refuses() {
    let dir = create_temp_dir();
    let path = dir.path().join("todos.db");
    let url = format!("file://{}", path.display());

    assert_eq!(init_collection(&url).unwrap(), Some(path.clone()));
    let store = FileStore::open(&path).unwrap();
    assert!(store.list(&TodoQuery::default()).unwrap().is_empty());

    assert!(matches!(
        init_collection(&url),
        Err(StoreError::AlreadyInitialized(_))
    ));
    assert_eq!(init_collection("memory://").unwrap(), None);
}
