//! Errors surfaced by the interceptor.
//!
//! None of these are translated into HTTP responses here; they leave the
//! service as its error and the caller decides how to present them.

use std::path::PathBuf;

use crate::engine::EngineError;

#[derive(Debug, thiserror::Error)]
pub enum InterceptError {
    #[error("cannot read stylesheet source {path}: {source}")]
    ReadSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("compile task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
