//! Compile-on-request decision logic.
//!
//! # Data Flow
//! ```text
//! request head
//!     → must_check (Check gate)
//!     → plan: asset name → source exists? → target matches request path?
//!     → compile: read source → engine.render → write css (+ .map)
//! ```
//!
//! Every request-scoped value lives in a [`CompileJob`] built inside the call;
//! the interceptor itself only holds read-only configuration.

pub mod paths;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use axum::http::request::Parts;
use serde_json::{json, Map, Value};

use crate::config::{SassConfig, SassOptions};
use crate::engine::{EngineError, LibSassEngine, RenderOptions, StylesheetEngine};
use crate::error::InterceptError;

pub use paths::AssetKind;

/// One stylesheet to produce for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileJob {
    pub filename: String,
    pub source_path: PathBuf,
    pub target_path: PathBuf,
}

impl CompileJob {
    /// `target_path` with `.map` appended.
    pub fn map_path(&self) -> PathBuf {
        let mut path = self.target_path.clone().into_os_string();
        path.push(".map");
        PathBuf::from(path)
    }
}

pub struct Interceptor {
    config: SassConfig,
    engine: Arc<dyn StylesheetEngine>,
}

impl Interceptor {
    /// Interceptor compiling with [`LibSassEngine`].
    pub fn new(overrides: &SassOptions) -> Self {
        Self::with_engine(overrides, LibSassEngine::new())
    }

    pub fn with_engine<E>(overrides: &SassOptions, engine: E) -> Self
    where
        E: StylesheetEngine + 'static,
    {
        let config = SassConfig::resolve(overrides);
        tracing::debug!(
            css_location = %config.css_location.display(),
            scss_location = %config.scss_location.display(),
            syntax = %config.syntax,
            create_map_file = config.create_map_file,
            "Stylesheet interceptor configured"
        );
        Self {
            config,
            engine: Arc::new(engine),
        }
    }

    pub fn config(&self) -> &SassConfig {
        &self.config
    }

    /// Where `filename` lives as compiled output or as source.
    pub fn resolve_path(&self, filename: &str, kind: AssetKind) -> PathBuf {
        paths::resolve_path(&self.config, filename, kind)
    }

    /// Evaluate the `check` gate for this request.
    pub fn must_check(&self, head: &Parts) -> bool {
        self.config.check.evaluate(head)
    }

    /// Decide whether `path_info` maps to a source that should be compiled.
    pub fn plan(&self, path_info: &str) -> Option<CompileJob> {
        let filename = paths::asset_name(path_info)?;

        let source_path = self.resolve_path(filename, AssetKind::Source);
        if !source_path.is_file() {
            tracing::debug!(path = %path_info, source = %source_path.display(), "No stylesheet source, passing through");
            return None;
        }

        let target_path = self.resolve_path(filename, AssetKind::Output);
        if !paths::matches_request(&target_path, path_info) {
            tracing::debug!(path = %path_info, target = %target_path.display(), "Request path does not match output location, passing through");
            return None;
        }

        Some(CompileJob {
            filename: filename.to_owned(),
            source_path,
            target_path,
        })
    }

    /// Plan and, when a job results, compile it. Blocking.
    pub fn prepare(&self, path_info: &str) -> Result<Option<CompileJob>, InterceptError> {
        let Some(job) = self.plan(path_info) else {
            return Ok(None);
        };
        self.compile(&job)?;
        Ok(Some(job))
    }

    /// Compile the job's source and overwrite its output files. Blocking.
    pub fn compile(&self, job: &CompileJob) -> Result<(), InterceptError> {
        let start = Instant::now();

        let source = fs::read_to_string(&job.source_path).map_err(|source| {
            InterceptError::ReadSource {
                path: job.source_path.clone(),
                source,
            }
        })?;

        let options = RenderOptions::from_map(self.engine_options(job))?;
        let rendered = self.engine.render(&source, &options).inspect_err(|e| {
            tracing::error!(source = %job.source_path.display(), error = %e, "Stylesheet compilation failed");
        })?;

        // The CSS references the map, so both must be available before either is written.
        let source_map = match (self.config.create_map_file, rendered.source_map) {
            (true, None) => return Err(EngineError::MissingSourceMap(job.filename.clone()).into()),
            (true, Some(source_map)) => Some(source_map),
            (false, _) => None,
        };

        write_output(&job.target_path, &rendered.css)?;
        if let Some(source_map) = source_map {
            write_output(&job.map_path(), &source_map)?;
        }

        tracing::info!(
            filename = %job.filename,
            target = %job.target_path.display(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Stylesheet compiled"
        );
        Ok(())
    }

    /// Engine options for a job: computed defaults, then caller overrides.
    pub fn engine_options(&self, job: &CompileJob) -> Map<String, Value> {
        let mut options = Map::new();
        options.insert("style".into(), json!("compressed"));
        options.insert("syntax".into(), json!(self.config.syntax));
        options.insert(
            "load_paths".into(),
            json!([self.config.scss_location.to_string_lossy()]),
        );
        options.insert(
            "input_path".into(),
            json!(job.source_path.to_string_lossy()),
        );

        if self.config.create_map_file {
            options.insert(
                "source_map_file".into(),
                json!(format!("{}.css.map", job.filename)),
            );
            options.insert("source_map_contents".into(), json!(true));
        }

        for (key, value) in &self.config.engine_options {
            options.insert(key.clone(), value.clone());
        }
        options
    }
}

impl std::fmt::Debug for Interceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interceptor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn write_output(path: &Path, contents: &str) -> Result<(), InterceptError> {
    fs::write(path, contents).map_err(|source| InterceptError::WriteOutput {
        path: path.to_path_buf(),
        source,
    })
}
