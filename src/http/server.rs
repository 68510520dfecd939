//! Development server: static files with on-request stylesheet compilation.
//!
//! # Responsibilities
//! - Serve `public_root` with `ServeDir`
//! - Put the [`SassLayer`] in front of it
//! - Turn compilation failures into `500` responses
//! - Wire up tracing and timeouts

use std::time::Duration;

use axum::{
    error_handling::HandleErrorLayer,
    http::StatusCode,
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tower::{BoxError, ServiceBuilder};
use tower_http::{services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::http::layer::SassLayer;

pub struct DevServer {
    router: Router,
    config: ServerConfig,
}

impl DevServer {
    pub fn new(config: ServerConfig) -> Self {
        let layer = SassLayer::new(&config.sass_options());
        Self::with_layer(config, layer)
    }

    /// Build the server around an already configured layer.
    pub fn with_layer(config: ServerConfig, layer: SassLayer) -> Self {
        tracing::info!(
            public_root = %config.public_root.display(),
            css_location = %layer.config().css_location.display(),
            scss_location = %layer.config().scss_location.display(),
            "Serving static files"
        );
        let router = Self::build_router(&config, layer);
        Self { router, config }
    }

    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, layer: SassLayer) -> Router {
        let static_files = ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_compile_error))
            .layer(layer)
            .service(ServeDir::new(&config.public_root));

        Router::new()
            .fallback_service(static_files)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// The fully layered router, for embedding or testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Serve until Ctrl+C.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn handle_compile_error(err: BoxError) -> Response {
    tracing::error!(error = %err, "Request failed while preparing stylesheet");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Stylesheet compilation failed: {err}"),
    )
        .into_response()
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
