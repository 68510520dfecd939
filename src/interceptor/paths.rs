//! Mapping between request paths and files on disk.
//!
//! The final segment of the request path, minus its extension, is the asset
//! name shared by the source file and the compiled file.

use std::path::{Path, PathBuf};

use crate::config::SassConfig;

/// Which side of the compilation a path refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// Compiled CSS under `css_location`.
    Output,
    /// Stylesheet source under `scss_location`.
    Source,
}

/// Absolute path of `filename` for the given side.
pub fn resolve_path(config: &SassConfig, filename: &str, kind: AssetKind) -> PathBuf {
    match kind {
        AssetKind::Output => config.css_location.join(format!("{filename}.css")),
        AssetKind::Source => config
            .scss_location
            .join(format!("{filename}.{}", config.syntax.extension())),
    }
}

/// Basename of the request path with its extension stripped.
///
/// `/css/main.css` → `main`. Returns `None` for paths ending in `/` or in a
/// dot segment.
pub fn asset_name(path_info: &str) -> Option<&str> {
    let basename = path_info.rsplit('/').next()?;
    if basename.is_empty() || basename == "." || basename == ".." {
        return None;
    }
    Path::new(basename).file_stem()?.to_str()
}

/// Whether `target` is the file the request path asks for.
///
/// The last two request segments must equal the output directory's name and
/// the compiled file's name.
pub fn matches_request(target: &Path, path_info: &str) -> bool {
    let mut segments = path_info.rsplit('/');
    let (Some(file), Some(dir)) = (segments.next(), segments.next()) else {
        return false;
    };

    let target_file = target.file_name().and_then(|name| name.to_str());
    let target_dir = target
        .parent()
        .and_then(Path::file_name)
        .and_then(|name| name.to_str());

    target_file == Some(file) && target_dir == Some(dir)
}
