//! Shared fixtures for integration testing.

use std::fs;
use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use sass_interceptor::{SassOptions, Syntax};
use tempfile::TempDir;
use tower::{BoxError, Service, ServiceExt};
use tower_http::services::ServeDir;

/// A site on disk:
///
/// ```text
/// public/css/already.css        precompiled, no source
/// public/scss/main.scss         body{color:yellow}
/// other-public/sassc/main.sass  indented syntax, color blue
/// other-public/stylesheets/     empty output directory
/// ```
pub struct Site {
    dir: TempDir,
}

#[allow(dead_code)]
impl Site {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for sub in ["public/css", "public/scss", "other-public/sassc", "other-public/stylesheets"] {
            fs::create_dir_all(root.join(sub)).unwrap();
        }
        fs::write(root.join("public/css/already.css"), ".already{color:yellow}").unwrap();
        fs::write(root.join("public/scss/main.scss"), "body{color:yellow}").unwrap();
        fs::write(root.join("other-public/sassc/main.sass"), "body\n  color: blue\n").unwrap();
        Self { dir }
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn write(&self, relative: &str, contents: &str) {
        fs::write(self.path(relative), contents).unwrap();
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).unwrap()
    }

    /// Sorted file names in a directory of the site.
    pub fn listing(&self, relative: &str) -> Vec<String> {
        list_dir(&self.path(relative))
    }

    /// Overrides pointing at `public/css` and `public/scss`.
    pub fn options(&self) -> SassOptions {
        SassOptions::new()
            .check(true)
            .css_location(self.path("public/css"))
            .scss_location(self.path("public/scss"))
    }

    /// Overrides pointing at the `other-public` tree with indented syntax.
    pub fn other_options(&self) -> SassOptions {
        SassOptions::new()
            .check(true)
            .css_location(self.path("other-public/stylesheets"))
            .scss_location(self.path("other-public/sassc"))
            .syntax(Syntax::Sass)
    }

    /// Static server for `/css` and `/stylesheets`, answering "Inner" elsewhere.
    pub fn downstream(&self) -> Router {
        Router::new()
            .nest_service("/css", ServeDir::new(self.path("public/css")))
            .nest_service("/stylesheets", ServeDir::new(self.path("other-public/stylesheets")))
            .fallback(|| async { "Inner" })
    }
}

pub fn list_dir(path: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(path)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: StatusCode,
    pub content_type: String,
    pub body: String,
}

/// Issue a GET through `service`.
pub async fn get<S>(service: S, path: &str) -> Result<Reply, BoxError>
where
    S: Service<Request<Body>, Response = Response<Body>>,
    S::Error: Into<BoxError>,
{
    let request = Request::get(path).body(Body::empty()).unwrap();
    let response = service.oneshot(request).await.map_err(Into::into)?;

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;

    Ok(Reply {
        status,
        content_type,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}
