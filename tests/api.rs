use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, UNIX_EPOCH};

use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use axum_test::multipart::{MultipartForm, Part};
use serde_json::{Value, json};
use tempfile::TempDir;

use portrait_studio::{
    config::Config,
    error::{AppError, Result},
    provider::{GenerationParams, ImageProvider},
    web::{AppState, build_router},
};

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nstub";

/// Counts invocations and either returns fixed bytes or fails with a
/// provider status.
struct StubProvider {
    calls: AtomicUsize,
    fail_with: Option<u16>,
}

impl StubProvider {
    fn succeeding() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail_with: None,
        })
    }

    fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail_with: Some(status),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageProvider for StubProvider {
    async fn generate_image(
        &self,
        _token: &str,
        _prompt: &str,
        _params: &GenerationParams,
    ) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.fail_with {
            Some(status) => Err(AppError::Provider {
                status,
                message: "Service Unavailable".to_string(),
            }),
            None => Ok(PNG_BYTES.to_vec()),
        }
    }
}

fn test_config(data_dir: &Path, token: Option<&str>) -> Config {
    let data_dir = data_dir.display().to_string();
    let token = token.map(str::to_string);
    Config::from_lookup(move |key| match key {
        "DATA_DIR" => Some(data_dir.clone()),
        "HF_TOKEN" => token.clone(),
        _ => None,
    })
}

fn test_server(token: Option<&str>, provider: Arc<StubProvider>) -> (TestServer, TempDir) {
    let tmp = tempfile::tempdir().unwrap();
    let config = test_config(tmp.path(), token);
    let state = AppState::from_config(&config, provider);
    let app = build_router(state, &config.static_dir, config.max_upload_bytes);
    (TestServer::new(app).unwrap(), tmp)
}

fn set_mtime(path: &Path, secs: u64) {
    let file = File::options().write(true).open(path).unwrap();
    file.set_modified(UNIX_EPOCH + Duration::from_secs(secs))
        .unwrap();
}

#[tokio::test]
async fn index_serves_client_page() {
    let (server, _tmp) = test_server(None, StubProvider::succeeding());

    let response = server.get("/").await;

    response.assert_status_ok();
    assert!(response.text().contains("/static/app.js"));
}

#[tokio::test]
async fn generate_with_json_returns_prompt_and_stored_image() {
    let provider = StubProvider::succeeding();
    let (server, _tmp) = test_server(Some("hf_test"), provider.clone());

    let response = server
        .post("/api/generate")
        .json(&json!({"style": "bw", "composition": "full", "prompt": "astronaut"}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["ok"], true);
    assert_eq!(
        body["prompt_used"],
        "astronaut, black and white portrait, high contrast, studio lighting, realistic, \
         full-length portrait, balanced composition, standing pose, photorealistic, \
         detailed eyes, natural skin tones, 8k, masterpiece"
    );
    assert_eq!(body["ref_image_url"], Value::Null);
    assert_eq!(provider.calls(), 1);

    let image_url = body["image_url"].as_str().unwrap();
    assert!(image_url.starts_with("/generated/gen_"));
    let image = server.get(image_url).await;
    image.assert_status_ok();
    assert_eq!(image.as_bytes().as_ref(), PNG_BYTES);
}

#[tokio::test]
async fn generate_with_urlencoded_form_falls_back_on_unknown_keys() {
    let (server, _tmp) = test_server(Some("hf_test"), StubProvider::succeeding());

    let response = server
        .post("/api/generate")
        .form(&[("style", "vaporwave"), ("composition", "quarter"), ("prompt", "  ")])
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let prompt = body["prompt_used"].as_str().unwrap();
    assert!(prompt.starts_with("studio headshot, natural soft light"), "{prompt}");
    assert!(prompt.contains("from waist up, centered composition, looking at camera"));
}

#[tokio::test]
async fn generate_without_body_uses_defaults() {
    let (server, _tmp) = test_server(Some("hf_test"), StubProvider::succeeding());

    let response = server.post("/api/generate").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert!(
        body["prompt_used"]
            .as_str()
            .unwrap()
            .starts_with("studio headshot")
    );
}

#[tokio::test]
async fn generate_multipart_stores_reference_image() {
    let (server, tmp) = test_server(Some("hf_test"), StubProvider::succeeding());

    let form = MultipartForm::new()
        .add_text("style", "film")
        .add_text("composition", "half")
        .add_text("prompt", "red scarf")
        .add_part(
            "image",
            Part::bytes(b"jpeg-bytes".to_vec())
                .file_name("Me.JPG")
                .mime_type("image/jpeg"),
        );
    let response = server.post("/api/generate").multipart(form).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert!(
        body["prompt_used"]
            .as_str()
            .unwrap()
            .starts_with("red scarf, cinematic portrait")
    );
    let ref_url = body["ref_image_url"].as_str().unwrap();
    assert!(ref_url.starts_with("/uploads/ref_") && ref_url.ends_with(".jpg"));
    let filename = ref_url.trim_start_matches("/uploads/");
    let stored = std::fs::read(tmp.path().join("uploads").join(filename)).unwrap();
    assert_eq!(stored, b"jpeg-bytes");
}

#[tokio::test]
async fn missing_token_fails_without_calling_provider() {
    let provider = StubProvider::succeeding();
    let (server, _tmp) = test_server(None, provider.clone());

    let response = server
        .post("/api/generate")
        .json(&json!({"style": "clean"}))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["ok"], false);
    assert!(body["error"].as_str().unwrap().contains("HF_TOKEN"));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn provider_error_becomes_500_with_message() {
    let provider = StubProvider::failing(503);
    let (server, _tmp) = test_server(Some("hf_test"), provider.clone());

    let response = server
        .post("/api/generate")
        .json(&json!({"style": "modern"}))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["ok"], false);
    let error = body["error"].as_str().unwrap();
    assert!(!error.is_empty());
    assert!(error.contains("503"));
    assert_eq!(provider.calls(), 1);

    let listing: Value = server.get("/api/images").await.json();
    assert_eq!(listing["images"], json!([]));
}

#[tokio::test]
async fn malformed_json_is_rejected_as_bad_request() {
    let provider = StubProvider::succeeding();
    let (server, _tmp) = test_server(Some("hf_test"), provider.clone());

    let response = server
        .post("/api/generate")
        .content_type("application/json")
        .bytes("{not json".into())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["ok"], false);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn upload_stores_file_and_serves_it_back() {
    let (server, _tmp) = test_server(None, StubProvider::succeeding());

    let form = MultipartForm::new().add_part(
        "image",
        Part::bytes(b"webp-bytes".to_vec())
            .file_name("photo.webp")
            .mime_type("image/webp"),
    );
    let response = server.post("/api/upload").multipart(form).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["ok"], true);
    let filename = body["filename"].as_str().unwrap();
    assert!(filename.starts_with("upload_") && filename.ends_with(".webp"));
    let url = body["url"].as_str().unwrap();
    assert_eq!(url, format!("/uploads/{filename}"));

    let served = server.get(url).await;
    served.assert_status_ok();
    assert_eq!(served.as_bytes().as_ref(), b"webp-bytes");
}

#[tokio::test]
async fn upload_without_image_field_is_rejected() {
    let (server, _tmp) = test_server(None, StubProvider::succeeding());

    let form = MultipartForm::new().add_text("style", "bw");
    let response = server.post("/api/upload").multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "No file part named 'image'");
}

#[tokio::test]
async fn upload_with_empty_filename_is_rejected() {
    let (server, _tmp) = test_server(None, StubProvider::succeeding());

    let form = MultipartForm::new().add_part("image", Part::bytes(b"x".to_vec()).file_name(""));
    let response = server.post("/api/upload").multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Empty filename");
}

#[tokio::test]
async fn upload_with_non_multipart_body_returns_json_error() {
    let (server, _tmp) = test_server(None, StubProvider::succeeding());

    let response = server.post("/api/upload").json(&json!({"image": "x"})).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(!body["error"].as_str().unwrap().is_empty());

    let empty = server.post("/api/upload").await;

    empty.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = empty.json();
    assert!(!body["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn upload_with_plain_text_image_field_has_no_file_part() {
    let (server, tmp) = test_server(None, StubProvider::succeeding());

    let form = MultipartForm::new().add_text("image", "not a file");
    let response = server.post("/api/upload").multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "No file part named 'image'");
    assert!(!tmp.path().join("uploads").exists());
}

#[tokio::test]
async fn images_are_listed_newest_first() {
    let (server, tmp) = test_server(None, StubProvider::succeeding());
    let generated = tmp.path().join("generated");
    std::fs::create_dir_all(&generated).unwrap();
    for (name, secs) in [
        ("gen_20240101-000000_aaaaaaaa.png", 1_700_000_000),
        ("gen_20240103-000000_cccccccc.png", 1_700_000_300),
        ("gen_20240102-000000_bbbbbbbb.png", 1_700_000_100),
        ("readme.txt", 1_700_000_900),
    ] {
        std::fs::write(generated.join(name), b"x").unwrap();
        set_mtime(&generated.join(name), secs);
    }

    let response = server.get("/api/images").await;

    response.assert_status_ok();
    let body: Value = response.json();
    let images = body["images"].as_array().unwrap();
    let mtimes: Vec<i64> = images.iter().map(|i| i["mtime"].as_i64().unwrap()).collect();
    assert_eq!(mtimes, vec![1_700_000_300, 1_700_000_100, 1_700_000_000]);
    assert_eq!(images[0]["filename"], "gen_20240103-000000_cccccccc.png");
    assert_eq!(images[0]["url"], "/generated/gen_20240103-000000_cccccccc.png");
}

#[tokio::test]
async fn listing_is_empty_before_anything_is_generated() {
    let (server, _tmp) = test_server(None, StubProvider::succeeding());

    let response = server.get("/api/images").await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({"images": []}));
}
