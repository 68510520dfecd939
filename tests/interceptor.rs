//! Request-level behavior of the stylesheet middleware.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use sass_interceptor::engine::EngineError;
use sass_interceptor::{AssetKind, Check, InterceptError, SassCompiler, SassOptions, Syntax};

mod common;

use common::{get, Site};

const KEEP: &str = "already.css";

fn untouched() -> Vec<String> {
    vec![KEEP.to_string()]
}

#[tokio::test]
async fn test_non_css_request_is_served() {
    let site = Site::new();
    let app = SassCompiler::new(site.downstream(), &site.options());

    let reply = get(app, "/").await.unwrap();
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, "Inner");
    assert_eq!(site.listing("public/css"), untouched());
}

#[tokio::test]
async fn test_existing_file_without_source_is_served() {
    let site = Site::new();
    let app = SassCompiler::new(site.downstream(), &site.options());

    let reply = get(app, "/css/already.css").await.unwrap();
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.content_type.starts_with("text/css"));
    assert!(reply.body.contains(".already{color:yellow}"));
    assert_eq!(site.listing("public/css"), untouched());
}

#[tokio::test]
async fn test_missing_file_without_source_is_not_found() {
    let site = Site::new();
    let app = SassCompiler::new(site.downstream(), &site.options());

    let reply = get(app, "/css/notfound.css").await.unwrap();
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(site.listing("public/css"), untouched());
}

#[tokio::test]
async fn test_source_under_wrong_prefix_passes_through() {
    let site = Site::new();
    let app = SassCompiler::new(site.downstream(), &site.options());

    let reply = get(app, "/wrong-css/main.css").await.unwrap();
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, "Inner");
    assert_eq!(site.listing("public/css"), untouched());
}

#[tokio::test]
async fn test_source_is_compiled_and_served() {
    let site = Site::new();
    let app = SassCompiler::new(site.downstream(), &site.options());

    let reply = get(app, "/css/main.css").await.unwrap();
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.content_type.starts_with("text/css"));
    assert!(reply.body.contains("body{color:yellow}"));
    assert!(reply.body.contains("sourceMappingURL=main.css.map"));
    assert_eq!(site.listing("public/css"), vec![KEEP, "main.css", "main.css.map"]);

    let map: serde_json::Value = serde_json::from_str(&site.read("public/css/main.css.map")).unwrap();
    assert_eq!(map["version"], 3);
    assert_eq!(map["sourcesContent"][0], "body{color:yellow}");
}

#[tokio::test]
async fn test_source_is_recompiled_on_every_request() {
    let site = Site::new();
    let app = SassCompiler::new(site.downstream(), &site.options());

    site.write("public/scss/tmp.scss", "body{color:yellow}");
    let first = get(app.clone(), "/css/tmp.css").await.unwrap();
    assert!(first.body.contains("body{color:yellow}"));

    site.write("public/scss/tmp.scss", "body{color:orange}");
    let second = get(app, "/css/tmp.css").await.unwrap();
    assert_eq!(second.status, StatusCode::OK);
    assert!(second.content_type.starts_with("text/css"));
    assert!(second.body.contains("body{color:orange}"));
    assert!(!second.body.contains("yellow"));
    assert!(second.body.contains("sourceMappingURL=tmp.css.map"));
    assert_eq!(site.listing("public/css"), vec![KEEP, "tmp.css", "tmp.css.map"]);
}

#[tokio::test]
async fn test_map_file_can_be_disabled() {
    let site = Site::new();
    let app = SassCompiler::new(site.downstream(), &site.options().create_map_file(false));

    let reply = get(app, "/css/main.css").await.unwrap();
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body.contains("body{color:yellow}"));
    assert!(!reply.body.contains("sourceMappingURL"));
    assert_eq!(site.listing("public/css"), vec![KEEP, "main.css"]);
}

#[tokio::test]
async fn test_middleware_can_be_disabled_via_check() {
    let site = Site::new();
    let app = SassCompiler::new(site.downstream(), &site.options().check(false));

    let reply = get(app, "/css/main.css").await.unwrap();
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(site.listing("public/css"), untouched());
}

#[tokio::test]
async fn test_check_can_be_a_predicate() {
    let site = Site::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();
    let check = Check::predicate(move |head| {
        recorder.lock().unwrap().push(head.uri.path().to_string());
        false
    });
    let app = SassCompiler::new(site.downstream(), &site.options().check(check));

    let reply = get(app, "/css/main.css").await.unwrap();
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(*seen.lock().unwrap(), vec!["/css/main.css".to_string()]);
    assert_eq!(site.listing("public/css"), untouched());
}

#[tokio::test]
async fn test_pass_through_response_equals_downstream_response() {
    let site = Site::new();
    for path in ["/", "/css/already.css", "/css/notfound.css", "/wrong-css/main.css"] {
        let direct = get(site.downstream(), path).await.unwrap();
        let app = SassCompiler::new(site.downstream(), &site.options());
        let intercepted = get(app, path).await.unwrap();
        assert_eq!(intercepted, direct, "response differs for {path}");
    }
    assert_eq!(site.listing("public/css"), untouched());
}

#[test]
fn test_css_location_is_expanded() {
    let site = Site::new();
    let overrides = SassOptions::new().css_location("other-public/stylesheets");
    let app = SassCompiler::new(site.downstream(), &overrides);

    let expected = std::env::current_dir().unwrap().join("other-public/stylesheets");
    assert_eq!(app.config().css_location, expected);
    assert_eq!(overrides.css_location, Some(PathBuf::from("other-public/stylesheets")));
    assert_eq!(overrides.scss_location, None);
}

#[test]
fn test_scss_location_is_expanded() {
    let site = Site::new();
    let overrides = SassOptions::new().scss_location("other-public/sassc");
    let snapshot = overrides.clone();
    let app = SassCompiler::new(site.downstream(), &overrides);

    let expected = std::env::current_dir().unwrap().join("other-public/sassc");
    assert_eq!(app.config().scss_location, expected);
    assert_eq!(overrides, snapshot);
}

#[test]
fn test_resolve_path() {
    let site = Site::new();
    let overrides = SassOptions::new()
        .css_location("other-public/stylesheets")
        .scss_location("other-public/sassc")
        .syntax(Syntax::Sass);
    let app = SassCompiler::new(site.downstream(), &overrides);

    let cwd = std::env::current_dir().unwrap();
    assert_eq!(
        app.resolve_path("main", AssetKind::Output),
        cwd.join("other-public/stylesheets").join("main.css")
    );
    assert_eq!(
        app.resolve_path("main", AssetKind::Source),
        cwd.join("other-public/sassc").join("main.sass")
    );
}

#[tokio::test]
async fn test_different_locations_and_syntax() {
    let site = Site::new();
    let app = SassCompiler::new(site.downstream(), &site.other_options());

    let reply = get(app, "/stylesheets/main.css").await.unwrap();
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.content_type.starts_with("text/css"));
    assert!(reply.body.contains("body{color:blue}"));
    assert!(reply.body.contains("sourceMappingURL=main.css.map"));
    assert_eq!(site.listing("other-public/stylesheets"), vec!["main.css", "main.css.map"]);
    assert_eq!(site.listing("public/css"), untouched());
}

#[tokio::test]
async fn test_absolute_source_location_with_default_output_layout() {
    let site = Site::new();
    let overrides = site
        .options()
        .scss_location(site.path("other-public/sassc"))
        .syntax(Syntax::Sass);
    let app = SassCompiler::new(site.downstream(), &overrides);

    let reply = get(app, "/css/main.css").await.unwrap();
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body.contains("body{color:blue}"));
    assert!(reply.body.contains("sourceMappingURL=main.css.map"));
    assert_eq!(site.listing("public/css"), vec![KEEP, "main.css", "main.css.map"]);
}

#[tokio::test]
async fn test_imports_resolve_from_source_directory() {
    let site = Site::new();
    site.write("public/scss/_palette.scss", "$accent: teal;");
    site.write("public/scss/site.scss", "@import 'palette';\na{color:$accent}");
    let app = SassCompiler::new(site.downstream(), &site.options());

    let reply = get(app, "/css/site.css").await.unwrap();
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body.contains("a{color:teal}"));
}

#[tokio::test]
async fn test_compile_error_propagates() {
    let site = Site::new();
    site.write("public/scss/broken.scss", "body{color:");
    let app = SassCompiler::new(site.downstream(), &site.options());

    let err = get(app, "/css/broken.css").await.unwrap_err();
    let err = err.downcast_ref::<InterceptError>().expect("intercept error");
    assert!(matches!(err, InterceptError::Engine(EngineError::Compile(_))));
    assert_eq!(site.listing("public/css"), untouched());
}

#[tokio::test]
async fn test_concurrent_requests_for_same_target() {
    let site = Site::new();
    let app = SassCompiler::new(site.downstream(), &site.options());

    let (a, b) = tokio::join!(get(app.clone(), "/css/main.css"), get(app, "/css/main.css"));
    let (a, b) = (a.unwrap(), b.unwrap());
    assert_eq!(a.status, StatusCode::OK);
    assert_eq!(b.status, StatusCode::OK);
    assert!(site.read("public/css/main.css").contains("body{color:yellow}"));
    assert_eq!(site.listing("public/css"), vec![KEEP, "main.css", "main.css.map"]);
}
