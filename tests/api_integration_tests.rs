//! Integration Tests for API Endpoints
//!
//! Tests the full request/response cycle against real images written to a
//! temporary source root.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use image::{ImageEncoder, RgbImage};
use imageserver::{api::create_router, AppState, Policy};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tower::ServiceExt;

// == Helper Functions ==

struct Fixture {
    _tmp: TempDir,
    cache: PathBuf,
    policy: Policy,
}

/// Source root holding a 400x300 `cat.jpg` and a 64x64 `icons/dot.png`.
fn fixture() -> Fixture {
    let tmp = TempDir::new().unwrap();
    let images = tmp.path().join("imgs");
    let cache = tmp.path().join("cache");
    std::fs::create_dir_all(images.join("icons")).unwrap();
    write_jpeg(&images.join("cat.jpg"), 400, 300);
    write_png(&images.join("icons/dot.png"), 64, 64);

    let policy = Policy::new(&images, &cache);
    Fixture {
        _tmp: tmp,
        cache,
        policy,
    }
}

fn pixels(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

fn write_jpeg(path: &Path, width: u32, height: u32) {
    let file = std::fs::File::create(path).unwrap();
    image::codecs::jpeg::JpegEncoder::new(file)
        .write_image(
            pixels(width, height).as_raw(),
            width,
            height,
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
}

fn write_png(path: &Path, width: u32, height: u32) {
    let file = std::fs::File::create(path).unwrap();
    image::codecs::png::PngEncoder::new(file)
        .write_image(
            pixels(width, height).as_raw(),
            width,
            height,
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
}

fn create_app(policy: Policy) -> Router {
    create_router(AppState::from_policy(policy))
}

async fn get(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_to_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn decoded_size(bytes: &[u8]) -> (u32, u32) {
    let img = image::load_from_memory(bytes).unwrap();
    (img.width(), img.height())
}

// == Resize Scenarios ==

#[tokio::test]
async fn test_explicit_size_and_quality() {
    let fx = fixture();
    let app = create_app(fx.policy.clone());

    let response = get(&app, "/thumb/200x150/85/cat.jpg").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
    let bytes = body_bytes(response).await;
    assert_eq!(decoded_size(&bytes), (200, 150));

    let stored = fx.cache.join("thumb/200x150/85/cat.jpg");
    assert_eq!(std::fs::read(stored).unwrap(), bytes);
}

#[tokio::test]
async fn test_width_only_without_quality() {
    let fx = fixture();
    let app = create_app(fx.policy.clone());

    let response = get(&app, "/thumb/200//cat.jpg").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(decoded_size(&body_bytes(response).await), (200, 150));
    assert!(fx.cache.join("thumb/200/cat.jpg").exists());
}

#[tokio::test]
async fn test_height_only_nested_path() {
    let fx = fixture();
    let app = create_app(fx.policy.clone());

    let response = get(&app, "/icons/x32/icons/dot.png").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    assert_eq!(decoded_size(&body_bytes(response).await), (32, 32));
}

#[tokio::test]
async fn test_pass_through_ignores_whitelist() {
    let fx = fixture();
    let app = create_app(fx.policy.clone().with_allowed_sizes(["100x100"]));

    for uri in ["/full//cat.jpg", "/full/400/cat.jpg", "/full/x300/cat.jpg"] {
        let response = get(&app, uri).await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        assert_eq!(decoded_size(&body_bytes(response).await), (400, 300));
    }
}

#[tokio::test]
async fn test_format_follows_extension() {
    let fx = fixture();
    // Same source name, PNG output requested through a png sibling
    std::fs::copy(
        fx.policy.source_root.join("cat.jpg"),
        fx.policy.source_root.join("cat.png"),
    )
    .unwrap();
    let app = create_app(fx.policy.clone());

    let response = get(&app, "/thumb/100/cat.png").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    let bytes = body_bytes(response).await;
    assert_eq!(image::guess_format(&bytes).unwrap(), image::ImageFormat::Png);
}

// == Error Scenarios ==

#[tokio::test]
async fn test_missing_size_segment_is_invalid_url() {
    let fx = fixture();
    let app = create_app(fx.policy.clone());

    let response = get(&app, "/thumb/cat.jpg").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response).await;
    assert_eq!(json["kind"], "InvalidURL");
}

#[tokio::test]
async fn test_missing_source_is_not_found() {
    let fx = fixture();
    let app = create_app(fx.policy.clone());

    let response = get(&app, "/thumb/100/missing.png").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response).await;
    assert_eq!(json["kind"], "ImageNotFound");
    assert!(!fx.cache.join("thumb/100/missing.png").exists());
}

#[tokio::test]
async fn test_unlisted_size_is_rejected() {
    let fx = fixture();
    let app = create_app(fx.policy.clone().with_allowed_sizes(["100x100"]));

    let response = get(&app, "/thumb/50x50/cat.jpg").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_to_json(response).await["kind"], "InvalidSize");

    let response = get(&app, "/thumb/100x100/cat.jpg").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_oversized_request_is_rejected() {
    let fx = fixture();
    let app = create_app(fx.policy.clone());

    for uri in ["/thumb/4000000000x3/cat.jpg", "/b/x4000000000/cat.jpg"] {
        let response = get(&app, uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body_to_json(response).await["kind"], "InvalidSize");
    }

    // The server keeps serving afterwards
    let response = get(&app, "/thumb/100/cat.jpg").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!fx.cache.join("thumb/4000000000x3/cat.jpg").exists());
}

#[tokio::test]
async fn test_max_dimension_is_configurable() {
    let fx = fixture();
    let app = create_app(fx.policy.clone().with_max_dimension(300));

    let response = get(&app, "/thumb/301x10/cat.jpg").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(&app, "/thumb/300x10/cat.jpg").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unlisted_quality_is_rejected() {
    let fx = fixture();
    let app = create_app(fx.policy.clone().with_allowed_qualities([60, 80]));

    let response = get(&app, "/thumb/100/70/cat.jpg").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_to_json(response).await["kind"], "InvalidQuality");

    let response = get(&app, "/thumb/100/80/cat.jpg").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_traversal_is_rejected() {
    let fx = fixture();
    let app = create_app(fx.policy.clone());

    let response = get(&app, "/thumb/100/../cache/cat.jpg").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// == Cache Behavior ==

#[tokio::test]
async fn test_identical_requests_are_deterministic() {
    let fx = fixture();
    let app = create_app(fx.policy.clone());

    let first = body_bytes(get(&app, "/thumb/120x90/70/cat.jpg").await).await;
    let second = body_bytes(get(&app, "/thumb/120x90/70/cat.jpg").await).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_serve_cached_skips_rendering() {
    let fx = fixture();
    let app = create_app(fx.policy.clone().with_serve_cached(true));

    assert_eq!(get(&app, "/thumb/100/cat.jpg").await.status(), StatusCode::OK);
    assert_eq!(get(&app, "/thumb/100/cat.jpg").await.status(), StatusCode::OK);

    let stats = body_to_json(get(&app, "/stats").await).await;
    assert_eq!(stats["generated"], 1);
    assert_eq!(stats["served_from_cache"], 1);
}

#[tokio::test]
async fn test_concurrent_identical_requests() {
    let fx = fixture();
    let app = create_app(fx.policy.clone());

    let requests = (0..8).map(|_| {
        let app = app.clone();
        tokio::spawn(async move { get(&app, "/thumb/160x120/cat.jpg").await })
    });
    for handle in requests.collect::<Vec<_>>() {
        let response = handle.await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let stored = std::fs::read(fx.cache.join("thumb/160x120/cat.jpg")).unwrap();
    assert_eq!(decoded_size(&stored), (160, 120));
}

// == Stats Endpoint ==

#[tokio::test]
async fn test_stats_count_outcomes() {
    let fx = fixture();
    let app = create_app(fx.policy.clone().with_allowed_sizes(["100x100"]));

    get(&app, "/thumb/100x100/cat.jpg").await;
    get(&app, "/thumb/cat.jpg").await;
    get(&app, "/thumb/100x100/missing.png").await;
    get(&app, "/thumb/10x10/cat.jpg").await;

    let response = get(&app, "/stats").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response).await;
    assert_eq!(json["generated"], 1);
    assert_eq!(json["failures"]["invalid_url"], 1);
    assert_eq!(json["failures"]["image_not_found"], 1);
    assert_eq!(json["failures"]["invalid_size"], 1);
    assert_eq!(json["total_requests"], 4);
}

#[tokio::test]
async fn test_health_endpoint() {
    let fx = fixture();
    let app = create_app(fx.policy.clone());

    let response = get(&app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response).await;
    assert_eq!(json["status"], "healthy");
}
