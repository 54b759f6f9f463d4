//! Thumbnail endpoint tests
//!
//! Frame extraction is faked so video paths are exercised without ffmpeg.

mod common;

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::{body_bytes, body_json, FakeExtractor, TestHarness};
use tower::ServiceExt;

fn decode_jpeg(bytes: &[u8]) -> image::DynamicImage {
    image::load_from_memory_with_format(bytes, image::ImageFormat::Jpeg).unwrap()
}

#[tokio::test]
async fn test_image_thumbnail_fits_box() {
    let harness = TestHarness::new();
    let response = harness.get("/api/thumb/0?p=beach.png").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/jpeg"
    );

    let img = decode_jpeg(&body_bytes(response.into_body()).await);
    assert_eq!((img.width(), img.height()), (320, 200));
    assert_eq!(harness.extractor.calls(), 0);
}

#[tokio::test]
async fn test_small_image_is_not_upscaled() {
    let harness = TestHarness::new();
    let response = harness.get("/api/thumb/0?p=Cat.png").await;

    let img = decode_jpeg(&body_bytes(response.into_body()).await);
    assert_eq!((img.width(), img.height()), (32, 32));
}

#[tokio::test]
async fn test_video_thumbnail_uses_extracted_frame() {
    let harness = TestHarness::new();
    let response = harness.get("/api/thumb/1?p=clip.mp4").await;

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = body_bytes(response.into_body()).await;
    assert_ne!(bytes, *harness.ctx.thumbnails.placeholder());

    // FakeExtractor returns a 320x180 red frame.
    let img = decode_jpeg(&bytes).to_rgb8();
    assert_eq!(img.dimensions(), (320, 180));
    let px = img.get_pixel(160, 90);
    assert!(px[0] > 150 && px[1] < 60, "unexpected pixel {px:?}");
    assert_eq!(harness.extractor.calls(), 1);

    let settings = &harness.ctx.config.thumbnails;
    let call = harness.extractor.last_call().unwrap();
    assert!(call.path.ends_with("clip.mp4"));
    assert_eq!(call.offset, settings.frame_offset());
    assert_eq!(call.offset, Duration::from_secs(3));
    assert_eq!(call.target_width, settings.width);
    assert_eq!(call.timeout, settings.extractor_timeout());
    assert_eq!(call.timeout, Duration::from_secs(15));
}

#[tokio::test]
async fn test_configured_offset_and_timeout_reach_extractor() {
    let mut config = mediashelf::config::Config::default();
    config.thumbnails.frame_offset_secs = 7.5;
    config.thumbnails.extractor_timeout_secs = 2;
    let harness = TestHarness::with_config(config, FakeExtractor::new(Duration::ZERO));

    let response = harness.get("/api/thumb/1?p=clip.mp4").await;
    assert_eq!(response.status(), StatusCode::OK);

    let call = harness.extractor.last_call().unwrap();
    assert_eq!(call.offset, Duration::from_millis(7500));
    assert_eq!(call.timeout, Duration::from_secs(2));
}

#[tokio::test]
async fn test_extractor_failure_falls_back_to_placeholder() {
    let harness = TestHarness::with_extractor(FakeExtractor::failing());
    let response = harness.get("/api/thumb/1?p=clip.mp4").await;

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = body_bytes(response.into_body()).await;
    assert_eq!(bytes, *harness.ctx.thumbnails.placeholder());

    let img = decode_jpeg(&bytes).to_rgb8();
    assert_eq!(img.dimensions(), (320, 200));
    let px = img.get_pixel(10, 10);
    for channel in px.0 {
        assert!(channel.abs_diff(40) <= 3, "unexpected pixel {px:?}");
    }
}

#[tokio::test]
async fn test_concurrent_requests_generate_once() {
    let harness = TestHarness::with_extractor(FakeExtractor::new(Duration::from_millis(100)));
    let router = harness.router();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let router = router.clone();
        handles.push(tokio::spawn(async move {
            let response = router
                .oneshot(
                    Request::get("/api/thumb/1?p=clip.mp4")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            body_bytes(response.into_body()).await
        }));
    }

    let mut bodies = Vec::new();
    for handle in handles {
        bodies.push(handle.await.unwrap());
    }

    assert_eq!(harness.extractor.calls(), 1);
    assert!(bodies.windows(2).all(|w| w[0] == w[1]));
}

#[tokio::test]
async fn test_repeat_request_is_served_from_cache() {
    let harness = TestHarness::new();

    let first = body_bytes(harness.get("/api/thumb/1?p=clip.mp4").await.into_body()).await;
    let second = body_bytes(harness.get("/api/thumb/1?p=clip.mp4").await.into_body()).await;

    assert_eq!(first, second);
    assert_eq!(harness.extractor.calls(), 1);
    assert_eq!(harness.ctx.thumbnails.cache().len(), 1);
}

#[tokio::test]
async fn test_directory_gets_placeholder() {
    let harness = TestHarness::new();
    let response = harness.get("/api/thumb/0?p=album").await;

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = body_bytes(response.into_body()).await;
    assert_eq!(bytes, *harness.ctx.thumbnails.placeholder());
    assert_eq!(harness.extractor.calls(), 0);
}

#[tokio::test]
async fn test_missing_source_is_404() {
    let harness = TestHarness::new();
    let response = harness.get("/api/thumb/0?p=gone.png").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response.into_body()).await["code"], "not_found");
    assert!(harness.ctx.thumbnails.cache().is_empty());
}

#[tokio::test]
async fn test_source_below_a_file_is_404() {
    let harness = TestHarness::new();
    let response = harness.get("/api/thumb/0?p=notes.txt/x.jpg").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response.into_body()).await["code"], "not_found");
    assert_eq!(harness.extractor.calls(), 0);
    assert!(harness.ctx.thumbnails.cache().is_empty());
}

#[tokio::test]
async fn test_traversal_is_rejected() {
    let harness = TestHarness::new();
    let response = harness.get("/api/thumb/0?p=../videos/clip.mp4").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(harness.extractor.calls(), 0);
}

#[tokio::test]
async fn test_missing_query_parameter_is_400() {
    let harness = TestHarness::new();
    let response = harness.get("/api/thumb/0").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
