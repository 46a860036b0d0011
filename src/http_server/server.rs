//! # HTTP Server
//!
//! Wires the todo routes, the root info document, permissive CORS, request
//! tracing, a catch-all 404 and a last-resort panic responder.

use std::any::Any;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use super::config::{RunMode, ServerConfig};
use super::info_routes::info_routes;
use crate::rest_api::response::ErrorResponse;
use crate::rest_api::{route_not_found, RestServer, TodoHandler};
use crate::store::TodoStore;

/// Mount point of the todo routes
pub const TODOS_PATH: &str = "/api/todos";

/// HTTP server for the todo API
pub struct HttpServer {
    config: ServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a server over `store` using `config`
    pub fn new<S: TodoStore + 'static>(config: ServerConfig, store: S) -> Self {
        let router = build_router(store, config.mode);
        Self { config, router }
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Start the HTTP server and run until Ctrl-C
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr = self.config.socket_addr();
        let listener = TcpListener::bind(&addr).await?;

        tracing::info!(
            addr = %listener.local_addr()?,
            mode = %self.config.mode,
            "todo API listening"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("server stopped");
        Ok(())
    }
}

/// Build the full application router over `store`
pub fn build_router<S: TodoStore + 'static>(store: S, mode: RunMode) -> Router {
    let handler = TodoHandler::new(store, mode.is_development());

    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin);

    let expose_panics = mode.is_development();

    Router::new()
        .merge(info_routes())
        .nest(TODOS_PATH, RestServer::new(handler).router())
        .fallback(route_not_found)
        .layer(CatchPanicLayer::custom(move |err: Box<dyn Any + Send + 'static>| {
            panic_response(err, expose_panics)
        }))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Converts an escaped handler panic into the generic 500 envelope.
fn panic_response(err: Box<dyn Any + Send + 'static>, expose: bool) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(error = %detail, "request handler panicked");

    let error = if expose {
        detail
    } else {
        "Internal server error".to_string()
    };
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("Something went wrong!").with_error(error)),
    )
        .into_response()
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
