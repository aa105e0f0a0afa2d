//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router mounting the backend under `/v1/auth/<mount>/`
//! - Wire up middleware (request ID, tracing, timeout)
//! - Translate HTTP requests into logical requests and dispatch them
//! - Serve a host-level health endpoint
//! - Record request metrics

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::PluginConfig;
use crate::framework::Backend;
use crate::http::request::{logical_operation, request_data, request_id, MakeRequestUuid};
use crate::http::response::{error_response, logical_error_response, respond_logical};
use crate::lifecycle::wait_for_shutdown;
use crate::logical::{Context, Request};
use crate::observability::metrics;

/// Extra time the transport-level timeout allows past the request context
/// deadline, so an overrunning handler is reported as `DeadlineExceeded`.
const TIMEOUT_LAYER_SLACK_SECS: u64 = 1;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub backend: Backend,
    pub mount: Arc<str>,
    pub request_timeout: Duration,
}

/// HTTP transport hosting one mounted backend.
pub struct HttpServer {
    router: Router,
    config: PluginConfig,
}

impl HttpServer {
    /// Create a new HTTP server for `backend` with the given configuration.
    pub fn new(config: PluginConfig, backend: Backend) -> Self {
        let state = AppState {
            backend,
            mount: Arc::from(config.mount.path.as_str()),
            request_timeout: Duration::from_secs(config.timeouts.request_secs),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &PluginConfig, state: AppState) -> Router {
        let mount_route = format!("/v1/auth/{}/{{*path}}", config.mount.path);

        Router::new()
            .route(&mount_route, any(backend_handler))
            .route("/v1/sys/health", get(health_handler))
            .fallback(fallback_handler)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs + TIMEOUT_LAYER_SLACK_SECS,
                    ))),
            )
    }

    /// The router with all layers applied; useful for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    /// Run the server until Ctrl+C or the shutdown broadcast fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            mount = %self.config.mount.path,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let cause = wait_for_shutdown(shutdown).await;
                tracing::info!(cause = %cause, "Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Dispatch a request under the mount point to the backend.
async fn backend_handler(
    State(state): State<AppState>,
    method: Method,
    Path(path): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(&headers);

    let Some(operation) = logical_operation(&method, &params) else {
        tracing::warn!(request_id = %request_id, method = %method, path = %path, "Unsupported HTTP method");
        metrics::record_request("unknown", StatusCode::METHOD_NOT_ALLOWED.as_u16(), start_time);
        return error_response(
            StatusCode::METHOD_NOT_ALLOWED,
            vec![format!("unsupported method: {}", method)],
        );
    };

    // Routing errors take precedence over a malformed body.
    let data = match state
        .backend
        .check_operation(path.trim_start_matches('/'), operation)
        .and_then(|()| request_data(operation, params, &body))
    {
        Ok(data) => data,
        Err(err) => {
            tracing::info!(
                request_id = %request_id,
                operation = %operation,
                path = %path,
                kind = err.kind(),
                "Request rejected before dispatch"
            );
            let resp = logical_error_response(&err);
            metrics::record_request(operation.as_str(), resp.status().as_u16(), start_time);
            return resp;
        }
    };

    tracing::debug!(
        request_id = %request_id,
        operation = %operation,
        path = %path,
        "Handling backend request"
    );

    let req = Request::new(operation, path)
        .with_data(data)
        .with_context(Context::background().with_timeout(state.request_timeout))
        .with_request_id(request_id.clone())
        .with_mount_point(format!("auth/{}/", state.mount));

    let result = state.backend.handle_request(req).await;
    if let Err(err) = &result {
        tracing::info!(
            request_id = %request_id,
            operation = %operation,
            kind = err.kind(),
            error = %err,
            "Backend request failed"
        );
    }

    let resp = respond_logical(result, &request_id);
    metrics::record_request(operation.as_str(), resp.status().as_u16(), start_time);
    resp
}

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub mount: String,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        mount: format!("auth/{}/", state.mount),
    })
}

async fn fallback_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, vec!["no handler for route".into()]).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request as HttpRequest;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::config::UiConfig;
    use crate::framework::{operation_fn, Path as RoutePath};
    use crate::jwt::factory;
    use crate::logical::{LogicalError, Operation};

    fn server_with_file(contents: Option<&str>) -> HttpServer {
        let dir = std::env::temp_dir().join(format!("jwt-server-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("test_ui.html");
        if let Some(contents) = contents {
            std::fs::write(&file, contents).unwrap();
        }

        let mut config = PluginConfig::default();
        config.ui = UiConfig { file_path: file };
        let backend = factory(&config.ui).unwrap();
        HttpServer::new(config, backend)
    }

    async fn send(server: &HttpServer, method: &str, uri: &str) -> Response {
        send_body(server, method, uri, "").await
    }

    async fn send_body(server: &HttpServer, method: &str, uri: &str, body: &str) -> Response {
        server
            .router()
            .oneshot(
                HttpRequest::builder()
                    .method(method)
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn body_string(resp: Response) -> String {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_ui_served_as_html() {
        let server = server_with_file(Some("<html>OK</html>"));
        let resp = send(&server, "GET", "/v1/auth/jwt/ui").await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["content-type"], "text/html");
        assert!(resp.headers().contains_key("x-request-id"));
        assert_eq!(body_string(resp).await, "<html>OK</html>");
    }

    #[tokio::test]
    async fn test_other_operations_rejected() {
        let server = server_with_file(Some("<html>OK</html>"));
        for (method, uri) in [
            ("POST", "/v1/auth/jwt/ui"),
            ("PUT", "/v1/auth/jwt/ui"),
            ("DELETE", "/v1/auth/jwt/ui"),
            ("LIST", "/v1/auth/jwt/ui"),
            ("GET", "/v1/auth/jwt/ui?list=true"),
        ] {
            let resp = send(&server, method, uri).await;
            assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED, "{method} {uri}");
        }
    }

    #[tokio::test]
    async fn test_missing_file_then_health() {
        let server = server_with_file(None);

        let resp = send(&server, "GET", "/v1/auth/jwt/ui").await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json: Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert!(json["errors"][0].as_str().unwrap().contains("test_ui.html"));

        let health = send(&server, "GET", "/v1/sys/health").await;
        assert_eq!(health.status(), StatusCode::OK);
        let json: Value = serde_json::from_str(&body_string(health).await).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["mount"], "auth/jwt/");
    }

    #[tokio::test]
    async fn test_help_query() {
        let server = server_with_file(Some("<html>OK</html>"));
        let resp = send(&server, "GET", "/v1/auth/jwt/ui?help=1").await;
        assert_eq!(resp.status(), StatusCode::OK);

        let json: Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(json["data"]["operation_id"], "jwt-ui");
        assert_eq!(json["data"]["display_attrs"]["operation_prefix"], "jwt");
    }

    #[tokio::test]
    async fn test_unknown_routes() {
        let server = server_with_file(Some("<html>OK</html>"));
        assert_eq!(
            send(&server, "GET", "/v1/auth/jwt/login").await.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            send(&server, "GET", "/v1/auth/oidc/ui").await.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            send(&server, "PATCH", "/v1/auth/jwt/ui").await.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[tokio::test]
    async fn test_malformed_body_does_not_mask_routing_errors() {
        let server = server_with_file(Some("<html>OK</html>"));

        let resp = send_body(&server, "POST", "/v1/auth/jwt/ui", "{not json").await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        let json: Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert!(json["errors"][0]
            .as_str()
            .unwrap()
            .contains("unsupported operation"));

        let resp = send_body(&server, "POST", "/v1/auth/jwt/nope", "{not json").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_body_rejected_on_writable_path() {
        let echo = RoutePath::builder("echo$")
            .operation(
                Operation::Write,
                operation_fn(|_ctx, _req, _data| async move { Ok::<_, LogicalError>(None) }),
            )
            .build()
            .unwrap();
        let backend = Backend::new("echo backend", vec![echo]).unwrap();
        let server = HttpServer::new(PluginConfig::default(), backend);

        let resp = send_body(&server, "POST", "/v1/auth/jwt/echo", "{not json").await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = send_body(&server, "POST", "/v1/auth/jwt/echo", "{}").await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_slow_handler_reports_deadline() {
        let slow = RoutePath::builder("slow$")
            .operation(
                Operation::Read,
                operation_fn(|_ctx, _req, _data| async move {
                    tokio::time::sleep(Duration::from_secs(10)).await;
                    Ok::<_, LogicalError>(None)
                }),
            )
            .build()
            .unwrap();
        let backend = Backend::new("slow backend", vec![slow]).unwrap();
        let mut config = PluginConfig::default();
        config.timeouts.request_secs = 1;
        let server = HttpServer::new(config, backend);

        let resp = send(&server, "GET", "/v1/auth/jwt/slow").await;
        assert_eq!(resp.status(), StatusCode::GATEWAY_TIMEOUT);
        let json: Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert!(json["errors"][0].is_string());
    }
}
