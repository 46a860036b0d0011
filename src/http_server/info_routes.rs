//! API description document served at the root path.

use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Serialize, Serializer};

use crate::rest_api::route_not_found;

/// Root document
#[derive(Debug, Serialize)]
pub struct ApiInfoResponse {
    pub message: String,
    pub version: String,
    pub endpoints: EndpointMap,
}

/// Route to description, serialized as a JSON object in declaration order
#[derive(Debug)]
pub struct EndpointMap(&'static [(&'static str, &'static str)]);

impl Serialize for EndpointMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(route, description)| (route, description)))
    }
}

const ENDPOINTS: [(&str, &str); 6] = [
    ("GET /api/todos", "Get all todos"),
    ("GET /api/todos/:id", "Get single todo"),
    ("POST /api/todos", "Create new todo"),
    ("PUT /api/todos/:id", "Update todo"),
    ("DELETE /api/todos/:id", "Delete todo"),
    ("PATCH /api/todos/:id/toggle", "Toggle todo completion"),
];

/// Create the root info route
pub fn info_routes() -> Router {
    Router::new().route("/", get(api_info_handler).fallback(route_not_found))
}

async fn api_info_handler() -> impl IntoResponse {
    let response = ApiInfoResponse {
        message: "Welcome to Todo List API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: EndpointMap(&ENDPOINTS),
    };

    (StatusCode::OK, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_serialize_as_ordered_object() {
        let json = serde_json::to_string(&EndpointMap(&ENDPOINTS)).unwrap();
        assert!(json.starts_with("{\"GET /api/todos\":\"Get all todos\","));
        assert!(json.ends_with("\"PATCH /api/todos/:id/toggle\":\"Toggle todo completion\"}"));
    }
}
