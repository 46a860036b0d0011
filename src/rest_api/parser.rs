//! # Request Parsing
//!
//! List query parameters and write payload bodies.
//!
//! Query parameters:
//! - `completed=true` filters completed todos; any other value filters open ones
//! - `priority=<value>` equality filter on the raw value
//! - `sortBy=<field>` sort key, default `createdAt`
//! - `order=desc|asc` descending only for `desc` (the default)
//!
//! Bodies are read as JSON or URL-encoded forms. Other content types read as
//! an empty payload, which then fails title validation.
//!
//! A todo id that cannot be decoded from the path matches no record.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::header;
use axum::http::request::Parts;
use axum::Form;
use serde_json::Value;

use super::errors::ApiError;
use crate::store::{SortOrder, TodoQuery};
use crate::todo::Payload;

/// Build a list query from raw query parameters.
pub fn parse_list_query(params: &HashMap<String, String>) -> TodoQuery {
    let mut query = TodoQuery::default();

    if let Some(completed) = params.get("completed") {
        query.completed = Some(completed == "true");
    }

    if let Some(priority) = params.get("priority").filter(|p| !p.is_empty()) {
        query.priority = Some(priority.clone());
    }

    if let Some(sort_by) = params.get("sortBy").filter(|s| !s.is_empty()) {
        query.sort_by = sort_by.clone();
    }

    if let Some(order) = params.get("order") {
        query.order = if order == "desc" {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        };
    }

    query
}

/// Todo id taken from the `:id` path segment
#[derive(Debug, Clone)]
pub struct TodoId(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for TodoId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<String>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(TodoId(id)),
            Err(rejection) => {
                tracing::debug!(error = %rejection.body_text(), "undecodable todo id");
                Err(ApiError::NotFound)
            }
        }
    }
}

/// Write payload extracted from a JSON or form body
#[derive(Debug, Clone, Default)]
pub struct TodoPayload(pub Payload);

#[axum::async_trait]
impl<S> FromRequest<S> for TodoPayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase())
            .unwrap_or_default();

        if content_type.starts_with("application/json") {
            let bytes = Bytes::from_request(req, state)
                .await
                .map_err(|e| ApiError::InvalidBody(e.body_text()))?;
            return parse_json_body(&bytes).map(TodoPayload);
        }

        if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|e| ApiError::InvalidBody(e.body_text()))?;
            let payload = pairs
                .into_iter()
                .map(|(key, value)| (key, Value::String(value)))
                .collect();
            return Ok(TodoPayload(payload));
        }

        Ok(TodoPayload::default())
    }
}

fn parse_json_body(bytes: &[u8]) -> Result<Payload, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Payload::new());
    }
    match serde_json::from_slice(bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::InvalidBody("expected a JSON object".to_string())),
        Err(e) => Err(ApiError::InvalidBody(e.to_string())),
    }
}
