//! # REST API Handler
//!
//! Translates each todo operation into a single store call and wraps the
//! outcome in a response envelope. Write handlers receive fields that have
//! already passed validation.

use crate::store::{StoreError, TodoQuery, TodoStore};
use crate::todo::{Todo, TodoFields};

use super::errors::{ApiError, RestResult};
use super::response::{ListResponse, MessageResponse, SingleResponse};

/// Todo operations over a store
pub struct TodoHandler<S: TodoStore> {
    store: S,
    /// Send store error text to clients
    expose_errors: bool,
}

impl<S: TodoStore> TodoHandler<S> {
    pub fn new(store: S, expose_errors: bool) -> Self {
        Self {
            store,
            expose_errors,
        }
    }

    /// List todos matching the query
    pub fn list(&self, query: &TodoQuery) -> RestResult<ListResponse<Todo>> {
        let todos = self.store.list(query).map_err(|e| self.store_error(e))?;
        tracing::debug!(count = todos.len(), sort_by = %query.sort_by, "listed todos");
        Ok(ListResponse::new(todos))
    }

    /// Get a single todo
    pub fn get(&self, id: &str) -> RestResult<SingleResponse<Todo>> {
        let todo = self
            .store
            .find(id)
            .map_err(|e| self.store_error(e))?
            .ok_or(ApiError::NotFound)?;
        Ok(SingleResponse::new(todo))
    }

    /// Create a todo
    pub fn create(&self, fields: TodoFields) -> RestResult<SingleResponse<Todo>> {
        let todo = self.store.insert(fields).map_err(|e| self.store_error(e))?;
        tracing::info!(todo_id = %todo.id, "created todo");
        Ok(SingleResponse::new(todo))
    }

    /// Update a todo with the provided fields
    pub fn update(&self, id: &str, fields: TodoFields) -> RestResult<SingleResponse<Todo>> {
        let todo = self
            .store
            .update(id, fields)
            .map_err(|e| self.store_error(e))?
            .ok_or(ApiError::NotFound)?;
        tracing::info!(todo_id = %todo.id, "updated todo");
        Ok(SingleResponse::new(todo))
    }

    /// Delete a todo
    pub fn delete(&self, id: &str) -> RestResult<MessageResponse> {
        let todo = self
            .store
            .delete(id)
            .map_err(|e| self.store_error(e))?
            .ok_or(ApiError::NotFound)?;
        tracing::info!(todo_id = %todo.id, "deleted todo");
        Ok(MessageResponse::new("Todo deleted successfully"))
    }

    /// Flip the completion flag of a todo
    pub fn toggle(&self, id: &str) -> RestResult<SingleResponse<Todo>> {
        let mut todo = self
            .store
            .find(id)
            .map_err(|e| self.store_error(e))?
            .ok_or(ApiError::NotFound)?;

        todo.completed = !todo.completed;

        // The record may have been deleted since the lookup.
        let todo = self
            .store
            .save(&todo)
            .map_err(|e| self.store_error(e))?
            .ok_or(ApiError::NotFound)?;
        tracing::info!(todo_id = %todo.id, completed = todo.completed, "toggled todo");
        Ok(SingleResponse::new(todo))
    }

    fn store_error(&self, source: StoreError) -> ApiError {
        ApiError::Store {
            source,
            expose: self.expose_errors,
        }
    }
}
