//! Observability for the todo API
//!
//! Logging goes through `tracing`. Handlers and stores emit events with
//! structured fields (`todo_id`, `count`, `error`); the HTTP layer adds one
//! span per request.
//!
//! # Usage
//!
//! ```ignore
//! use todo_api::observability::init_logging;
//! use todo_api::http_server::RunMode;
//!
//! init_logging(RunMode::Production)?;
//! tracing::info!(todo_id = %id, "created todo");
//! ```

mod logger;

pub use logger::{default_filter, init_logging};
