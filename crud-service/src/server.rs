//! HTTP server with graceful shutdown

use axum::{http::StatusCode, Router};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

use crate::{config::Config, crud::recover_from_panic, error::Result};

/// Server instance
pub struct Server {
    config: Config,
}

impl Server {
    /// Create a new server instance
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the server with the given router until SIGINT or SIGTERM
    pub async fn serve(self, app: Router) -> Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.service.port));

        tracing::info!(service = %self.config.service.name, %addr, "starting server");
        self.log_middleware_config();

        let app = self.apply_layers(app);

        let listener = TcpListener::bind(&addr).await?;
        tracing::info!(%addr, "server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("server shutdown complete");

        Ok(())
    }

    /// Wrap the router in the configured middleware stack
    ///
    /// Layers added last run first: panic recovery is outermost so a panic
    /// in any layer or handler still gets the protocol's 500 answer.
    pub fn apply_layers(&self, app: Router) -> Router {
        let middleware = &self.config.middleware;

        let mut app = app
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().include_headers(true))
                    .on_response(DefaultOnResponse::new().include_headers(true)),
            )
            .layer(RequestBodyLimitLayer::new(middleware.body_limit_bytes()))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                self.config.service.timeout(),
            ));

        if middleware.compression {
            app = app.layer(CompressionLayer::new());
        }

        app = app.layer(self.build_cors_layer());

        if middleware.catch_panic {
            app = app.layer(CatchPanicLayer::custom(recover_from_panic));
        }

        app
    }

    fn log_middleware_config(&self) {
        let middleware = &self.config.middleware;
        tracing::info!(
            catch_panic = middleware.catch_panic,
            compression = middleware.compression,
            cors_mode = %middleware.cors_mode,
            body_limit_mb = middleware.body_limit_mb,
            timeout_secs = self.config.service.timeout_secs,
            min_page_size = self.config.paging.min_page_size,
            max_page_size = self.config.paging.max_page_size,
            "middleware configuration"
        );
    }

    /// Build CORS layer based on configuration
    fn build_cors_layer(&self) -> CorsLayer {
        match self.config.middleware.cors_mode.as_str() {
            "permissive" => CorsLayer::permissive(),
            "restrictive" | "disabled" => CorsLayer::new(),
            other => {
                tracing::warn!(cors_mode = other, "unknown CORS mode, defaulting to permissive");
                CorsLayer::permissive()
            }
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!(%error, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(error) => {
                tracing::error!(%error, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        },
    }
}
