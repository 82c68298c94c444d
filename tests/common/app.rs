//! Test application factory for integration tests.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use inkframe::models::{AppConfig, VAULT_PASSWORD_HEADER};
use inkframe::server::{build_router, create_app_state, AppState};
use inkframe::services::GalleryService;

use super::fixtures::{TEST_PANEL, VAULT_PASSWORD};

/// Test application with router and direct access to the gallery.
///
/// Every instance owns a fresh temporary data directory.
pub struct TestApp {
    router: axum::Router,
    pub gallery: Arc<GalleryService>,
    pub config: Arc<AppConfig>,
    data_dir: TempDir,
}

impl TestApp {
    /// Small panel, vault password set
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Start from the test defaults and adjust the config before the state
    /// is built.
    pub fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let data_dir = TempDir::new().expect("Failed to create temp dir");
        let mut config = test_config(data_dir.path());
        adjust(&mut config);

        let state = create_app_state(config).expect("Failed to create app state");
        Self::from_state(state, data_dir)
    }

    fn from_state(state: AppState, data_dir: TempDir) -> Self {
        let gallery = state.gallery.clone();
        let config = state.config.clone();
        let router = build_router(state);

        Self {
            router,
            gallery,
            config,
            data_dir,
        }
    }

    pub fn data_dir(&self) -> &Path {
        self.data_dir.path()
    }

    pub fn image_file(&self, name: &str) -> PathBuf {
        self.config.images_dir().join(format!("{name}.bmp"))
    }

    pub fn thumb_file(&self, name: &str) -> PathBuf {
        self.config.thumbs_dir().join(format!("{name}.bmp"))
    }

    pub fn panel_file(&self, file: &str) -> PathBuf {
        self.config.panel_output_dir().join(file)
    }

    /// Make a GET request to the given path
    pub async fn get(&self, path: &str) -> TestResponse {
        self.get_with_headers(path, &[]).await
    }

    /// Make a GET request with custom headers
    pub async fn get_with_headers(&self, path: &str, headers: &[(&str, &str)]) -> TestResponse {
        let mut builder = Request::get(path);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        self.request(builder.body(Body::empty()).unwrap()).await
    }

    /// GET with the vault password header
    pub async fn get_unlocked(&self, path: &str) -> TestResponse {
        self.get_with_headers(path, &[(VAULT_PASSWORD_HEADER, VAULT_PASSWORD)])
            .await
    }

    /// Make a POST request with JSON body
    pub async fn post_json(&self, path: &str, headers: &[(&str, &str)], body: &str) -> TestResponse {
        self.json_request("POST", path, headers, body).await
    }

    /// Make a PUT request with JSON body
    pub async fn put_json(&self, path: &str, body: &str) -> TestResponse {
        self.put_json_with_headers(path, &[], body).await
    }

    /// Make a PUT request with JSON body and custom headers
    pub async fn put_json_with_headers(
        &self,
        path: &str,
        headers: &[(&str, &str)],
        body: &str,
    ) -> TestResponse {
        self.json_request("PUT", path, headers, body).await
    }

    /// Make a POST request without a body
    pub async fn post(&self, path: &str, headers: &[(&str, &str)]) -> TestResponse {
        let mut builder = Request::post(path);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        self.request(builder.body(Body::empty()).unwrap()).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str, headers: &[(&str, &str)]) -> TestResponse {
        let mut builder = Request::delete(path);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        self.request(builder.body(Body::empty()).unwrap()).await
    }

    /// Upload raw image bytes
    pub async fn upload(&self, filename: &str, bytes: Vec<u8>, show: bool) -> TestResponse {
        let path = format!("/api/images?filename={filename}&show={show}");
        let request = Request::post(path)
            .header("Content-Type", "application/octet-stream")
            .body(Body::from(bytes))
            .unwrap();
        self.request(request).await
    }

    /// Upload and assert success
    pub async fn upload_ok(&self, filename: &str, bytes: Vec<u8>) -> serde_json::Value {
        let response = self.upload(filename, bytes, false).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text());
        response.json()
    }

    async fn json_request(
        &self,
        method: &str,
        path: &str,
        headers: &[(&str, &str)],
        body: &str,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        self.request(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Send a request to the router
    async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes()
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Config rooted at `data_dir` with a tiny panel so tests stay fast
pub fn test_config(data_dir: &Path) -> AppConfig {
    let mut config = AppConfig {
        data_dir: data_dir.to_path_buf(),
        ..AppConfig::default()
    };
    config.panel.width = TEST_PANEL.width;
    config.panel.height = TEST_PANEL.height;
    config.thumbnail.max_width = 10;
    config.thumbnail.max_height = 10;
    config.with_vault_password(Some(VAULT_PASSWORD.to_string()))
}

/// Test response with convenience methods
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Parse body as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON response")
    }

    /// Get body as string
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Get raw body bytes
    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// Check if response is a BMP image
    pub fn is_bmp(&self) -> bool {
        self.body.len() >= 2 && &self.body[0..2] == b"BM"
    }
}
