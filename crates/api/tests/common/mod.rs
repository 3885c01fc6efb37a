#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use clipforge_api::config::ServerConfig;
use clipforge_api::router::build_app_router;
use clipforge_api::state::AppState;
use clipforge_core::{GenerationRequest, JobId, VendorStatus};
use clipforge_vendor::{
    PollSettings, ProviderError, ProviderKind, ProviderSettings, VideoProvider,
};
use http_body_util::BodyExt;
use tower::ServiceExt;

pub const VIDEO_URL: &str = "https://cdn.example.com/videos/task_test.mp4";

/// Build a test `ServerConfig` with safe defaults.
///
/// Polling runs at 5 ms so real-clock tests finish fast; tests that need the
/// production budget use [`PollSettings::default`] on a paused clock.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["*".to_string()],
        request_timeout_secs: 330,
        max_upload_bytes: 1024 * 1024,
        static_dir: PathBuf::from("does-not-exist"),
        provider: ProviderSettings {
            kind: ProviderKind::ApiMart,
            api_key: "test-key".to_string(),
            base_url: None,
            model: None,
            aspect_ratio: "16:9".to_string(),
            size: "1280x720".to_string(),
            http_timeout: Duration::from_secs(5),
        },
        poll: PollSettings {
            interval: Duration::from_millis(5),
            timeout: Duration::from_secs(5),
        },
    }
}

/// Build the full application router around `provider`, using the same
/// middleware stack as `main.rs`.
pub fn build_test_app(provider: Arc<ScriptedProvider>) -> Router {
    build_test_app_with(provider, test_config())
}

pub fn build_test_app_with(provider: Arc<ScriptedProvider>, config: ServerConfig) -> Router {
    let state = AppState::new(config.clone(), provider);
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Scripted provider
// ---------------------------------------------------------------------------

/// In-memory vendor. `create_job` returns the configured result once, then
/// `task_test`; `get_status` replays the script, then repeats the last
/// fallback status.
pub struct ScriptedProvider {
    kind: ProviderKind,
    create_result: Mutex<Option<ProviderError>>,
    statuses: Mutex<VecDeque<Result<VendorStatus, ProviderError>>>,
    fallback: VendorStatus,
    status_delay: Duration,
    pub create_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
    pub last_request: Mutex<Option<GenerationRequest>>,
}

impl ScriptedProvider {
    pub fn new(statuses: Vec<Result<VendorStatus, ProviderError>>) -> Self {
        Self {
            kind: ProviderKind::ApiMart,
            create_result: Mutex::new(None),
            statuses: Mutex::new(statuses.into()),
            fallback: VendorStatus::Pending {
                status: Some("processing".into()),
            },
            status_delay: Duration::ZERO,
            create_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Completes with [`VIDEO_URL`] on the first status call.
    pub fn completing() -> Arc<Self> {
        Arc::new(Self::new(vec![Ok(completed(VIDEO_URL))]))
    }

    /// Rejects job creation with `err`.
    pub fn rejecting(err: ProviderError) -> Arc<Self> {
        let provider = Self::new(Vec::new());
        *provider.create_result.lock().unwrap() = Some(err);
        Arc::new(provider)
    }

    pub fn with_kind(mut self, kind: ProviderKind) -> Self {
        self.kind = kind;
        self
    }

    /// Every status call takes `delay` before answering.
    pub fn with_status_delay(mut self, delay: Duration) -> Self {
        self.status_delay = delay;
        self
    }

    pub fn creates(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn polls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> GenerationRequest {
        self.last_request
            .lock()
            .unwrap()
            .clone()
            .expect("no job was created")
    }
}

#[async_trait]
impl VideoProvider for ScriptedProvider {
    async fn create_job(&self, request: &GenerationRequest) -> Result<JobId, ProviderError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        match self.create_result.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(JobId::new("task_test").unwrap()),
        }
    }

    async fn get_status(&self, _: &JobId) -> Result<VendorStatus, ProviderError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if !self.status_delay.is_zero() {
            tokio::time::sleep(self.status_delay).await;
        }
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(self.fallback.clone()))
    }

    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn requires_prompt(&self) -> bool {
        self.kind == ProviderKind::OpenAi
    }
}

pub fn pending() -> VendorStatus {
    VendorStatus::Pending {
        status: Some("processing".into()),
    }
}

pub fn completed(url: &str) -> VendorStatus {
    VendorStatus::Completed {
        video_url: Some(url.into()),
    }
}

// ---------------------------------------------------------------------------
// Multipart bodies
// ---------------------------------------------------------------------------

pub const BOUNDARY: &str = "clipforge-test-boundary";

/// One multipart form part.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: Option<&'a str>,
        data: &'a [u8],
    },
}

/// A small valid-looking PNG header.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Everything up to and including the start of a final text part that never
/// finishes: the opening parts, the header of `name`, and `partial`.
pub fn truncated_multipart_body(parts: &[Part<'_>], name: &str, partial: &str) -> Vec<u8> {
    let mut body = multipart_body(parts);
    let closing = format!("--{BOUNDARY}--\r\n");
    body.truncate(body.len() - closing.len());
    body.extend_from_slice(
        format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{partial}")
            .as_bytes(),
    );
    body
}

/// The common case: a PNG image part.
pub fn png_image() -> Part<'static> {
    Part::File {
        name: "image",
        file_name: "photo.png",
        content_type: Some("image/png"),
        data: PNG_BYTES,
    }
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                        .as_bytes(),
                );
            }
            Part::File {
                name,
                file_name,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n"
                    )
                    .as_bytes(),
                );
                if let Some(ct) = content_type {
                    body.extend_from_slice(format!("Content-Type: {ct}\r\n").as_bytes());
                }
                body.extend_from_slice(b"\r\n");
                body.extend_from_slice(data);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// POST a multipart form to `/generate`.
pub async fn post_generate(app: Router, parts: &[Part<'_>]) -> Response<Body> {
    let request = Request::post("/generate")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
