//! HTTP server with graceful shutdown

use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{
    catch_panic::CatchPanicLayer,
    limit::RequestBodyLimitLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

use crate::{
    config::Config,
    error::Result,
    middleware::{access_log, apply_cors_headers, preflight_layer},
    routes,
    state::AppState,
};

/// Server instance
pub struct Server {
    config: Config,
}

impl Server {
    /// Create a new server instance
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the server until SIGINT or SIGTERM
    ///
    /// The listener binds without waiting for the store. Once in-flight
    /// requests have drained, the store connection is released.
    pub async fn serve(self, state: AppState) -> Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.service.port));

        tracing::info!("Starting {} on {}", self.config.service.name, addr);

        self.log_middleware_config();

        let app = self.app(routes::router(state.clone()));

        let listener = TcpListener::bind(&addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        state.store().close().await;

        tracing::info!("Server shutdown complete");

        Ok(())
    }

    /// Wrap `router` in the middleware stack
    ///
    /// Outer to inner: CORS response headers, CORS preflight, access log,
    /// tracing, body size limit, panic recovery.
    pub fn app(&self, router: Router) -> Router {
        let app = router
            // Panic recovery (innermost layer)
            .layer(CatchPanicLayer::new())
            .layer(RequestBodyLimitLayer::new(
                self.config.middleware.body_limit_bytes(),
            ))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().include_headers(false))
                    .on_response(DefaultOnResponse::new()),
            )
            .layer(axum::middleware::from_fn(access_log))
            .layer(preflight_layer());

        apply_cors_headers(app)
    }

    /// Log middleware configuration for debugging
    fn log_middleware_config(&self) {
        tracing::info!("Middleware configuration:");
        tracing::info!("  - Panic recovery: enabled");
        tracing::info!(
            "  - Request body limit: {} MB",
            self.config.middleware.body_limit_mb
        );
        tracing::info!("  - CORS: any origin");
        if self.config.access_log.enabled {
            tracing::info!(
                "  - Access log: {}",
                self.config.access_log.path().display()
            );
        } else {
            tracing::info!("  - Access log: disabled");
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl+C), starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }

    tracing::info!("Shutdown signal received, draining requests...");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreHandle;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        routing::get,
    };
    use tower::ServiceExt;

    fn degraded_app(config: Config) -> Router {
        let server = Server::new(config.clone());
        server.app(routes::router(AppState::new(config, StoreHandle::disconnected())))
    }

    fn assert_cors(response: &axum::response::Response) {
        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_METHODS],
            "GET, POST, DELETE, OPTIONS"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
    }

    #[test]
    fn test_server_creation() {
        let config = Config::default();
        let server = Server::new(config.clone());
        assert_eq!(server.config().service.port, config.service.port);
    }

    #[tokio::test]
    async fn test_cors_headers_on_store_failure() {
        let response = degraded_app(Config::default())
            .oneshot(Request::builder().uri("/goals").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_cors(&response);
    }

    #[tokio::test]
    async fn test_cors_headers_on_validation_failure() {
        let response = degraded_app(Config::default())
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/goals")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"text":""}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_cors(&response);
    }

    #[tokio::test]
    async fn test_oversized_body_is_refused() {
        let mut config = Config::default();
        config.middleware.body_limit_mb = 1;
        let body = vec![b'a'; 2 * 1024 * 1024];

        let response = degraded_app(config)
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/goals")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(header::CONTENT_LENGTH, body.len())
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_cors(&response);
    }

    #[tokio::test]
    async fn test_panic_becomes_500_with_cors() {
        async fn boom() -> &'static str {
            panic!("handler blew up")
        }

        let server = Server::new(Config::default());
        let app = server.app(Router::new().route("/boom", get(boom)));

        let response = app
            .oneshot(Request::builder().uri("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_cors(&response);
    }
}
