//! Stylesheet compilation engine boundary.
//!
//! The interceptor treats compilation as a pure function: source text and
//! options in, compiled CSS and an optional source map out. Options travel as
//! a JSON object so integrators can pass keys the interceptor knows nothing
//! about; [`RenderOptions`] is the typed view an engine reads.

pub mod native;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::Syntax;

pub use native::LibSassEngine;

/// Output formatting requested from the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStyle {
    #[default]
    Expanded,
    Compressed,
}

/// Options consumed by an engine.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct RenderOptions {
    #[serde(default)]
    pub style: OutputStyle,

    #[serde(default)]
    pub syntax: Syntax,

    /// Directories searched by `@use` / `@import`.
    #[serde(default)]
    pub load_paths: Vec<PathBuf>,

    /// Path of the file being compiled, used to name the map's source.
    #[serde(default)]
    pub input_path: Option<PathBuf>,

    /// When set, a source map is produced and the CSS references this name.
    #[serde(default)]
    pub source_map_file: Option<String>,

    /// Embed the source text in the map instead of only referencing it.
    #[serde(default)]
    pub source_map_contents: bool,

    /// Keys not understood here, passed through verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RenderOptions {
    /// Build typed options from a merged option map.
    pub fn from_map(options: Map<String, Value>) -> Result<Self, EngineError> {
        serde_json::from_value(Value::Object(options)).map_err(EngineError::Options)
    }
}

/// Result of one engine invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub css: String,
    pub source_map: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid engine options: {0}")]
    Options(#[source] serde_json::Error),

    #[error("stylesheet compilation failed: {0}")]
    Compile(String),

    #[error("cannot serialize source map: {0}")]
    SourceMap(#[source] serde_json::Error),

    #[error("engine returned no source map for {0}")]
    MissingSourceMap(String),
}

/// A stylesheet compiler.
pub trait StylesheetEngine: Send + Sync {
    fn render(&self, source: &str, options: &RenderOptions) -> Result<Rendered, EngineError>;
}

impl<F> StylesheetEngine for F
where
    F: Fn(&str, &RenderOptions) -> Result<Rendered, EngineError> + Send + Sync,
{
    fn render(&self, source: &str, options: &RenderOptions) -> Result<Rendered, EngineError> {
        self(source, options)
    }
}
