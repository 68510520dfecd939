//! On-request stylesheet compilation middleware.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ───────────────▶ SassCompiler ──check──▶ Interceptor::prepare
//!                           │                    │  asset name → source path
//!                           │                    │  source exists? request path matches?
//!                           │                    │  engine.render() → write css (+ map)
//!                           ▼                    ▼
//!                     downstream service (static files) ──▶ Client Response
//! ```
//!
//! The interceptor never answers a request itself. It writes the compiled
//! stylesheet into the directory the downstream service reads from and then
//! forwards the untouched request.

pub mod config;
pub mod engine;
pub mod error;
pub mod http;
pub mod interceptor;
pub mod observability;

pub use config::{Check, SassConfig, SassOptions, ServerConfig, Syntax};
pub use engine::{LibSassEngine, RenderOptions, Rendered, StylesheetEngine};
pub use error::InterceptError;
pub use http::{DevServer, SassCompiler, SassLayer};
pub use interceptor::{AssetKind, CompileJob, Interceptor};
