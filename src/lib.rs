//! todo-api - A CRUD HTTP API for todo items
//!
//! Requests flow: router → (writes only) validator → handler → record store.
//! No state is shared between requests outside the store.

pub mod cli;
pub mod http_server;
pub mod observability;
pub mod rest_api;
pub mod store;
pub mod todo;
