//! # Todo REST API Module
//!
//! HTTP endpoints for CRUD operations on todos. Each request maps to one
//! store call; write payloads are validated before they reach the store.

pub mod errors;
pub mod handler;
pub mod parser;
pub mod response;
pub mod server;

pub use errors::{route_not_found, ApiError, RestResult};
pub use handler::TodoHandler;
pub use parser::{parse_list_query, TodoId, TodoPayload};
pub use server::RestServer;
