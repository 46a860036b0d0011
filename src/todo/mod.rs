//! # Todo Domain
//!
//! The todo record, its write payload, and the field validator applied
//! to every create and update request before it reaches the store.

pub mod model;
pub mod validator;

pub use model::{Priority, Todo, TodoFields};
pub use validator::{validate_todo, FieldViolation, Payload};
