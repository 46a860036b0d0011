//! # REST API Routes
//!
//! Axum route table for `/api/todos`. Validation runs in front of the
//! create and update handlers only.
//!
//! Store calls are synchronous and may hit the disk, so every handler runs
//! its store work on the blocking pool.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};

use crate::store::TodoStore;
use crate::todo::{validate_todo, Todo, TodoFields};

use super::errors::{route_not_found, ApiError, RestResult};
use super::handler::TodoHandler;
use super::parser::{parse_list_query, TodoId, TodoPayload};
use super::response::{ListResponse, MessageResponse, SingleResponse};

/// REST API server state
pub struct RestServer<S: TodoStore> {
    handler: Arc<TodoHandler<S>>,
}

impl<S: TodoStore + 'static> RestServer<S> {
    pub fn new(handler: TodoHandler<S>) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// Build the Axum router, relative to the mount point.
    ///
    /// Unsupported methods on known paths answer like unknown routes.
    pub fn router(self) -> Router {
        Router::new()
            .route(
                "/",
                get(list_handler::<S>)
                    .post(create_handler::<S>)
                    .fallback(route_not_found),
            )
            .route(
                "/:id",
                get(get_handler::<S>)
                    .put(update_handler::<S>)
                    .delete(delete_handler::<S>)
                    .fallback(route_not_found),
            )
            .route("/:id/toggle", patch(toggle_handler::<S>).fallback(route_not_found))
            .with_state(self.handler)
    }
}

/// Shared state type
type ServerState<S> = Arc<TodoHandler<S>>;

/// Validation step composed in front of the write handlers
fn validated(payload: TodoPayload) -> RestResult<TodoFields> {
    validate_todo(&payload.0).map_err(|errors| {
        tracing::debug!(violations = errors.len(), "rejected todo payload");
        ApiError::Validation(errors)
    })
}

/// Runs `op` against the handler on the blocking pool.
///
/// A panic inside `op` is resumed on the request task so the panic
/// responder sees it like any other handler panic.
async fn blocking<S, T>(
    handler: ServerState<S>,
    op: impl FnOnce(&TodoHandler<S>) -> RestResult<T> + Send + 'static,
) -> RestResult<T>
where
    S: TodoStore + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(move || op(&handler)).await {
        Ok(result) => result,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => Err(ApiError::TaskFailed(e.to_string())),
    }
}

async fn list_handler<S: TodoStore + 'static>(
    State(handler): State<ServerState<S>>,
    Query(params): Query<HashMap<String, String>>,
) -> RestResult<Json<ListResponse<Todo>>> {
    let query = parse_list_query(&params);
    blocking(handler, move |h| h.list(&query)).await.map(Json)
}

async fn get_handler<S: TodoStore + 'static>(
    State(handler): State<ServerState<S>>,
    TodoId(id): TodoId,
) -> RestResult<Json<SingleResponse<Todo>>> {
    blocking(handler, move |h| h.get(&id)).await.map(Json)
}

async fn create_handler<S: TodoStore + 'static>(
    State(handler): State<ServerState<S>>,
    payload: TodoPayload,
) -> RestResult<(StatusCode, Json<SingleResponse<Todo>>)> {
    let fields = validated(payload)?;
    let result = blocking(handler, move |h| h.create(fields)).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

async fn update_handler<S: TodoStore + 'static>(
    State(handler): State<ServerState<S>>,
    TodoId(id): TodoId,
    payload: TodoPayload,
) -> RestResult<Json<SingleResponse<Todo>>> {
    let fields = validated(payload)?;
    blocking(handler, move |h| h.update(&id, fields)).await.map(Json)
}

async fn delete_handler<S: TodoStore + 'static>(
    State(handler): State<ServerState<S>>,
    TodoId(id): TodoId,
) -> RestResult<Json<MessageResponse>> {
    blocking(handler, move |h| h.delete(&id)).await.map(Json)
}

async fn toggle_handler<S: TodoStore + 'static>(
    State(handler): State<ServerState<S>>,
    TodoId(id): TodoId,
) -> RestResult<Json<SingleResponse<Todo>>> {
    blocking(handler, move |h| h.toggle(&id)).await.map(Json)
}
