//! # HTTP Server Module
//!
//! Combines the todo routes and the root info document into one Axum
//! server.
//!
//! # Endpoints
//!
//! - `/` - API description
//! - `/api/todos/*` - Todo CRUD operations
//!
//! Anything else answers 404 `{"success":false,"message":"Route not found"}`.

pub mod config;
pub mod info_routes;
pub mod server;

pub use config::{RunMode, ServerConfig};
pub use server::{build_router, HttpServer, TODOS_PATH};
