//! Engine backed by libsass through `sass_rs`.
//!
//! The binding returns compiled CSS only, so the map document is assembled
//! here: it names the output file and the source, optionally embeds the
//! source text, and carries empty mappings.

use serde::Serialize;
use serde_json::Value;

use crate::config::Syntax;
use crate::engine::{EngineError, OutputStyle, RenderOptions, Rendered, StylesheetEngine};

/// libsass default number precision.
const DEFAULT_PRECISION: usize = 5;

#[derive(Debug, Clone, Copy, Default)]
pub struct LibSassEngine;

impl LibSassEngine {
    pub fn new() -> Self {
        Self
    }
}

impl StylesheetEngine for LibSassEngine {
    fn render(&self, source: &str, options: &RenderOptions) -> Result<Rendered, EngineError> {
        let precision = options
            .extra
            .get("precision")
            .and_then(Value::as_u64)
            .map_or(DEFAULT_PRECISION, |p| p as usize);

        let sass_options = sass_rs::Options {
            output_style: match options.style {
                OutputStyle::Compressed => sass_rs::OutputStyle::Compressed,
                OutputStyle::Expanded => sass_rs::OutputStyle::Expanded,
            },
            precision,
            indented_syntax: options.syntax == Syntax::Sass,
            include_paths: options
                .load_paths
                .iter()
                .map(|path| path.to_string_lossy().into_owned())
                .collect(),
        };

        let mut css = sass_rs::compile_string(source, sass_options).map_err(EngineError::Compile)?;

        let Some(map_file) = options.source_map_file.as_deref() else {
            return Ok(Rendered { css, source_map: None });
        };

        let source_map = SourceMap::new(map_file, options, source);
        let payload = serde_json::to_string(&source_map).map_err(EngineError::SourceMap)?;

        if !css.is_empty() && !css.ends_with('\n') {
            css.push('\n');
        }
        css.push_str(&format!("/*# sourceMappingURL={map_file} */"));

        Ok(Rendered {
            css,
            source_map: Some(payload),
        })
    }
}

/// Version 3 source map document.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SourceMap<'a> {
    version: u8,
    file: &'a str,
    sources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sources_content: Option<Vec<&'a str>>,
    names: Vec<String>,
    mappings: &'a str,
}

impl<'a> SourceMap<'a> {
    fn new(map_file: &'a str, options: &RenderOptions, source: &'a str) -> Self {
        let file = map_file.strip_suffix(".map").unwrap_or(map_file);
        let source_name = options
            .input_path
            .as_deref()
            .and_then(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("stdin.{}", options.syntax.extension()));

        Self {
            version: 3,
            file,
            sources: vec![source_name],
            sources_content: options.source_map_contents.then(|| vec![source]),
            names: Vec::new(),
            mappings: "",
        }
    }
}
