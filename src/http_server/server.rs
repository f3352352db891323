//! # HTTP Server
//!
//! Combines the record collection routers, the health check and the static
//! frontend into one axum server.

use std::io;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::Request,
    handler::HandlerWithoutStateExt,
    middleware::{self, Next},
    response::Response,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use uuid::Uuid;

use crate::observability::{log_event_with_fields, Event};
use crate::record::{RecordKind, RecordStore};
use crate::rest_api::{record_routes, ApiError, RecordService};

use super::config::HttpServerConfig;

/// HTTP server for the record service
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig, store: Arc<dyn RecordStore>) -> Self {
        let router = Self::build_router(&config, store);
        Self { config, router }
    }

    fn build_router(config: &HttpServerConfig, store: Arc<dyn RecordStore>) -> Router {
        let service = RecordService::new(store);

        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        // `/` resolves to static_dir/index.html. Anything that is neither an
        // API route nor a file under static_dir gets the JSON 404 envelope.
        let static_files = ServeDir::new(&config.static_dir)
            .call_fallback_on_method_not_allowed(true)
            .not_found_service(not_found.into_service());

        let mut router = Router::new().route("/health", get(health));
        for kind in RecordKind::ALL {
            router = router.merge(record_routes(kind, service.clone()));
        }

        router
            .fallback_service(static_files)
            .layer(middleware::from_fn(log_requests))
            .layer(cors)
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Bind and serve until Ctrl-C
    pub async fn start(self) -> Result<(), io::Error> {
        let listener = TcpListener::bind(self.config.socket_addr()).await?;
        let local_addr = listener.local_addr()?.to_string();
        log_event_with_fields(Event::ServerListening, &[("addr", local_addr.as_str())]);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn not_found() -> ApiError {
    ApiError::RouteNotFound
}

async fn log_requests(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let elapsed_ms = started.elapsed().as_millis().to_string();
    log_event_with_fields(
        Event::RequestHandled,
        &[
            ("request_id", request_id.as_str()),
            ("method", method.as_str()),
            ("path", path.as_str()),
            ("status", response.status().as_str()),
            ("elapsed_ms", elapsed_ms.as_str()),
        ],
    );
    response
}

async fn shutdown_signal() {
    // If the handler cannot be installed, serve until the process is killed
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
