//! Tower middleware wrapping a downstream service.
//!
//! # Responsibilities
//! - Evaluate the `check` gate on the request head
//! - Run planning and compilation on the blocking pool
//! - Forward the untouched request to the inner service, always
//!
//! Errors from compilation or the filesystem become the service error; the
//! response is never altered.

use std::path::PathBuf;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::http::Request;
use futures_util::future::BoxFuture;
use tower::{BoxError, Layer, Service};

use crate::config::{SassConfig, SassOptions};
use crate::engine::StylesheetEngine;
use crate::error::InterceptError;
use crate::interceptor::{AssetKind, Interceptor};

/// Layer producing [`SassCompiler`] services that share one interceptor.
#[derive(Debug, Clone)]
pub struct SassLayer {
    interceptor: Arc<Interceptor>,
}

impl SassLayer {
    pub fn new(overrides: &SassOptions) -> Self {
        Self::from_interceptor(Arc::new(Interceptor::new(overrides)))
    }

    pub fn with_engine<E>(overrides: &SassOptions, engine: E) -> Self
    where
        E: StylesheetEngine + 'static,
    {
        Self::from_interceptor(Arc::new(Interceptor::with_engine(overrides, engine)))
    }

    pub fn from_interceptor(interceptor: Arc<Interceptor>) -> Self {
        Self { interceptor }
    }

    pub fn config(&self) -> &SassConfig {
        self.interceptor.config()
    }

    pub fn resolve_path(&self, filename: &str, kind: AssetKind) -> PathBuf {
        self.interceptor.resolve_path(filename, kind)
    }
}

impl<S> Layer<S> for SassLayer {
    type Service = SassCompiler<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SassCompiler {
            inner,
            interceptor: self.interceptor.clone(),
        }
    }
}

/// Service compiling stylesheets before handing requests to `inner`.
#[derive(Debug, Clone)]
pub struct SassCompiler<S> {
    inner: S,
    interceptor: Arc<Interceptor>,
}

impl<S> SassCompiler<S> {
    pub fn new(inner: S, overrides: &SassOptions) -> Self {
        SassLayer::new(overrides).layer(inner)
    }

    pub fn with_engine<E>(inner: S, overrides: &SassOptions, engine: E) -> Self
    where
        E: StylesheetEngine + 'static,
    {
        SassLayer::with_engine(overrides, engine).layer(inner)
    }

    pub fn config(&self) -> &SassConfig {
        self.interceptor.config()
    }

    pub fn resolve_path(&self, filename: &str, kind: AssetKind) -> PathBuf {
        self.interceptor.resolve_path(filename, kind)
    }
}

impl<S, ReqBody> Service<Request<ReqBody>> for SassCompiler<S>
where
    S: Service<Request<ReqBody>> + Clone + Send + 'static,
    S::Response: Send + 'static,
    S::Error: Into<BoxError>,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
{
    type Response = S::Response;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, request: Request<ReqBody>) -> Self::Future {
        let interceptor = self.interceptor.clone();
        // Keep the instance that was driven to readiness.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let (parts, body) = request.into_parts();

            if interceptor.must_check(&parts) {
                let path = parts.uri.path().to_owned();
                tokio::task::spawn_blocking(move || interceptor.prepare(&path))
                    .await
                    .map_err(InterceptError::Join)??;
            } else {
                tracing::trace!(path = %parts.uri.path(), "Check disabled, passing through");
            }

            let response = inner
                .call(Request::from_parts(parts, body))
                .await
                .map_err(Into::<BoxError>::into)?;
            Ok::<_, BoxError>(response)
        })
    }
}
