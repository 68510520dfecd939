//! Configuration schema definitions.
//!
//! [`SassOptions`] is what an integrator hands to the middleware: every field
//! is optional and only the ones present override the defaults.
//! [`SassConfig`] is the resolved, immutable form consulted on every request.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::http::request::Parts;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Environment variable consulted for the default `check` gate.
pub const ENVIRONMENT_VAR: &str = "APP_ENV";

const DEFAULT_CSS_LOCATION: &str = "public/css";
const DEFAULT_SCSS_LOCATION: &str = "public/scss";

/// Stylesheet dialect of the source files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Syntax {
    #[default]
    Scss,
    /// Indented syntax.
    Sass,
    Css,
}

impl Syntax {
    /// File extension of source files written in this syntax.
    pub fn extension(self) -> &'static str {
        match self {
            Syntax::Scss => "scss",
            Syntax::Sass => "sass",
            Syntax::Css => "css",
        }
    }
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Gate deciding whether a request is considered for compilation at all.
#[derive(Clone)]
pub enum Check {
    Fixed(bool),
    Dynamic(Arc<dyn Fn(&Parts) -> bool + Send + Sync>),
}

impl Check {
    /// Build a gate from a predicate over the request head.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Parts) -> bool + Send + Sync + 'static,
    {
        Check::Dynamic(Arc::new(f))
    }

    /// Compile unless `APP_ENV` says this is a production environment.
    pub fn from_environment() -> Self {
        let environment = std::env::var(ENVIRONMENT_VAR).ok();
        Check::Fixed(environment.as_deref() != Some("production"))
    }

    pub fn evaluate(&self, head: &Parts) -> bool {
        match self {
            Check::Fixed(enabled) => *enabled,
            Check::Dynamic(predicate) => predicate(head),
        }
    }
}

impl Default for Check {
    fn default() -> Self {
        Self::from_environment()
    }
}

impl From<bool> for Check {
    fn from(enabled: bool) -> Self {
        Check::Fixed(enabled)
    }
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Check::Fixed(enabled) => f.debug_tuple("Fixed").field(enabled).finish(),
            Check::Dynamic(_) => f.write_str("Dynamic(<predicate>)"),
        }
    }
}

impl PartialEq for Check {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Check::Fixed(a), Check::Fixed(b)) => a == b,
            (Check::Dynamic(a), Check::Dynamic(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

// Only the boolean form can come from a config file.
impl<'de> Deserialize<'de> for Check {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        bool::deserialize(deserializer).map(Check::Fixed)
    }
}

/// Caller-supplied overrides. Absent fields fall back to the defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SassOptions {
    /// Whether interception runs at all (fixed or per request).
    pub check: Option<Check>,

    /// Dialect, and therefore extension, of source files.
    pub syntax: Option<Syntax>,

    /// Directory compiled CSS is written to (default `public/css`).
    pub css_location: Option<PathBuf>,

    /// Directory source files are read from (default `public/scss`).
    pub scss_location: Option<PathBuf>,

    /// Write a `.map` file next to each compiled stylesheet (default `true`).
    pub create_map_file: Option<bool>,

    /// Extra engine options, merged last over the computed defaults.
    pub engine_options: Map<String, Value>,
}

impl SassOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(mut self, check: impl Into<Check>) -> Self {
        self.check = Some(check.into());
        self
    }

    pub fn syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = Some(syntax);
        self
    }

    pub fn css_location(mut self, location: impl Into<PathBuf>) -> Self {
        self.css_location = Some(location.into());
        self
    }

    pub fn scss_location(mut self, location: impl Into<PathBuf>) -> Self {
        self.scss_location = Some(location.into());
        self
    }

    pub fn create_map_file(mut self, create: bool) -> Self {
        self.create_map_file = Some(create);
        self
    }

    pub fn engine_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.engine_options.insert(key.into(), value.into());
        self
    }
}

/// Resolved middleware configuration. Locations are absolute and normalized
/// whenever the working directory is readable.
#[derive(Debug, Clone)]
pub struct SassConfig {
    pub check: Check,
    pub syntax: Syntax,
    pub css_location: PathBuf,
    pub scss_location: PathBuf,
    pub create_map_file: bool,
    pub engine_options: Map<String, Value>,
}

impl SassConfig {
    /// Merge `overrides` over the defaults and absolutize both locations.
    ///
    /// Relative locations are joined onto the working directory and `.`/`..`
    /// are resolved lexically. If the working directory cannot be read, a
    /// warning is logged and the location is kept relative.
    pub fn resolve(overrides: &SassOptions) -> Self {
        let css_location = overrides
            .css_location
            .as_deref()
            .unwrap_or(Path::new(DEFAULT_CSS_LOCATION));
        let scss_location = overrides
            .scss_location
            .as_deref()
            .unwrap_or(Path::new(DEFAULT_SCSS_LOCATION));

        Self {
            check: overrides.check.clone().unwrap_or_default(),
            syntax: overrides.syntax.unwrap_or_default(),
            css_location: absolutize(css_location),
            scss_location: absolutize(scss_location),
            create_map_file: overrides.create_map_file.unwrap_or(true),
            engine_options: overrides.engine_options.clone(),
        }
    }
}

impl Default for SassConfig {
    fn default() -> Self {
        Self::resolve(&SassOptions::default())
    }
}

fn absolutize(path: &Path) -> PathBuf {
    absolutize_from(path, std::env::current_dir())
}

/// Join `path` onto `cwd` and normalize it lexically.
///
/// When the working directory cannot be read, the location stays relative and
/// is then resolved by the OS at each file access.
fn absolutize_from(path: &Path, cwd: std::io::Result<PathBuf>) -> PathBuf {
    if path.is_absolute() {
        return normalize(path);
    }
    match cwd {
        Ok(cwd) => normalize(&cwd.join(path)),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Cannot read working directory, keeping relative location");
            normalize(path)
        }
    }
}

/// Drop `.` components and resolve `..` against the preceding component.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(component.as_os_str()),
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Root configuration for the development server binary.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listener: ListenerConfig,

    /// Directory served as static files.
    pub public_root: PathBuf,

    pub timeouts: TimeoutConfig,

    pub observability: ObservabilityConfig,

    /// Middleware overrides. Unset locations default to `css`/`scss` under `public_root`.
    pub sass: SassOptions,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            public_root: PathBuf::from("public"),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
            sass: SassOptions::default(),
        }
    }
}

impl ServerConfig {
    /// Middleware options with locations anchored under `public_root`.
    pub fn sass_options(&self) -> SassOptions {
        let mut options = self.sass.clone();
        options
            .css_location
            .get_or_insert_with(|| self.public_root.join("css"));
        options
            .scss_location
            .get_or_insert_with(|| self.public_root.join("scss"));
        options
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (compile included) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default tracing directives when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "sass_interceptor=debug,tower_http=debug".to_string(),
        }
    }
}
