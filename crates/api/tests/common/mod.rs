#![allow(dead_code)]

use std::net::IpAddr;
use std::path::PathBuf;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use chrono::Utc;
use folio_api::config::ServerConfig;
use folio_api::router::build_app_router;
use folio_api::session::{Session, SessionKey};
use folio_api::state::AppState;
use folio_db::DatabaseConfig;
use http_body_util::BodyExt;
use sqlx::postgres::PgConnectOptions;
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Multipart boundary used by [`multipart_body`].
pub const BOUNDARY: &str = "----folio-test-boundary";

fn workspace_dir(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .join(name)
}

/// Build a test `ServerConfig` pointing at the repository templates and
/// assets, with uploads going to `upload_dir`.
pub fn test_config(upload_dir: PathBuf) -> ServerConfig {
    ServerConfig {
        host: IpAddr::from([127, 0, 0, 1]),
        port: 0,
        request_timeout_secs: 30,
        max_upload_bytes: 1024 * 1024,
        session_secret: TEST_SECRET.to_string(),
        template_dir: workspace_dir("templates"),
        assets_dir: workspace_dir("assets"),
        upload_dir,
        database: DatabaseConfig {
            connect: PgConnectOptions::new(),
            max_connections: 1,
        },
    }
}

/// A router plus the temporary upload directory it writes to.
pub struct TestApp {
    pub router: Router,
    pub upload_dir: TempDir,
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub fn build_test_app(pool: PgPool) -> TestApp {
    let upload_dir = tempfile::tempdir().expect("temp upload dir");
    let state = AppState::new(pool, test_config(upload_dir.path().to_path_buf()));
    TestApp {
        router: build_app_router(state),
        upload_dir,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: &TestApp, request: Request<Body>) -> Response<Body> {
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &TestApp, uri: &str, cookie: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(c) = cookie {
        builder = builder.header(COOKIE, c);
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}

pub async fn post_form(
    app: &TestApp,
    uri: &str,
    body: &str,
    cookie: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(c) = cookie {
        builder = builder.header(COOKIE, c);
    }
    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}

/// POST `body` with no `Content-Type` header at all.
pub async fn post_untyped(app: &TestApp, uri: &str, body: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_multipart(app: &TestApp, uri: &str, body: Vec<u8>) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

/// Encode text fields and an optional `(field, filename, bytes)` file part.
pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((name, filename, data)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert a 303 See Other and return its `Location`.
pub fn see_other_location(response: &Response<Body>) -> String {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    response.headers()[LOCATION].to_str().unwrap().to_string()
}

/// Full `Set-Cookie` header for the session cookie, if the response wrote one.
pub fn set_cookie_header(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("session="))
        .map(str::to_string)
}

/// The `session=<value>` pair suitable for a follow-up `Cookie` header.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    set_cookie_header(response).map(|h| h.split(';').next().unwrap().to_string())
}

/// Decode a `session=<value>` pair with the test signing key.
pub fn decode_session(cookie: &str) -> Session {
    let mut headers = axum::http::HeaderMap::new();
    headers.insert(COOKIE, cookie.parse().unwrap());
    Session::from_headers(&headers, &SessionKey::new(TEST_SECRET), Utc::now())
}
