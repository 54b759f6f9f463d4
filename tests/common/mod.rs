//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which lays out a small media library in a
//! temporary directory and builds a full [`AppContext`] around it. Frame
//! extraction is replaced by [`FakeExtractor`] so tests never need ffmpeg.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use bytes::Bytes;
use http_body_util::BodyExt;
use mediashelf::config::Config;
use mediashelf::server::{create_router, AppContext};
use mediashelf::thumbnails::{FrameExtractor, PrefixSniffer};
use tempfile::TempDir;
use tower::ServiceExt;

/// Size of the generated `clip.mp4` fixture.
pub const CLIP_SIZE: usize = 1000;

/// Arguments of the most recent [`FakeExtractor`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractCall {
    pub path: PathBuf,
    pub offset: Duration,
    pub target_width: u32,
    pub timeout: Duration,
}

/// Frame extractor double that counts invocations and records arguments.
pub struct FakeExtractor {
    calls: AtomicUsize,
    last_call: Mutex<Option<ExtractCall>>,
    delay: Duration,
    fail: bool,
}

impl FakeExtractor {
    pub fn new(delay: Duration) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            last_call: Mutex::new(None),
            delay,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            last_call: Mutex::new(None),
            delay: Duration::ZERO,
            fail: true,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_call(&self) -> Option<ExtractCall> {
        self.last_call.lock().unwrap().clone()
    }
}

#[async_trait]
impl FrameExtractor for FakeExtractor {
    async fn extract_frame(
        &self,
        path: &Path,
        offset: Duration,
        target_width: u32,
        timeout: Duration,
    ) -> mediashelf_common::Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_call.lock().unwrap() = Some(ExtractCall {
            path: path.to_path_buf(),
            offset,
            target_width,
            timeout,
        });
        tokio::time::sleep(self.delay).await;
        if self.fail {
            return Err(mediashelf_common::Error::tool("ffmpeg", "exit status: 1"));
        }
        Ok(png_bytes(target_width, target_width * 9 / 16, [200, 10, 10]))
    }
}

/// Test harness wrapping a fully-constructed [`AppContext`].
pub struct TestHarness {
    pub ctx: AppContext,
    pub extractor: Arc<FakeExtractor>,
    /// Holds the library alive for the duration of the test.
    pub dir: TempDir,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_extractor(FakeExtractor::new(Duration::ZERO))
    }

    pub fn with_extractor(extractor: FakeExtractor) -> Self {
        Self::with_config(Config::default(), extractor)
    }

    /// Build the harness around `config`; its roots are replaced by the
    /// fixture library.
    pub fn with_config(config: Config, extractor: FakeExtractor) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let photos = dir.path().join("photos");
        let videos = dir.path().join("videos");
        std::fs::create_dir(&photos).unwrap();
        std::fs::create_dir(&videos).unwrap();
        populate_photos(&photos);
        populate_videos(&videos);

        let config = Config {
            roots: vec![photos, videos],
            ..config
        };

        let extractor = Arc::new(extractor);
        let ctx = AppContext::with_services(
            config,
            Arc::new(PrefixSniffer::new(2048)),
            extractor.clone(),
        )
        .unwrap();

        Self {
            ctx,
            extractor,
            dir,
        }
    }

    pub fn router(&self) -> Router {
        create_router(self.ctx.clone(), None)
    }

    pub fn root(&self, index: usize) -> PathBuf {
        self.ctx.config.roots[index].clone()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.router()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    pub async fn get_range(&self, uri: &str, range: &str) -> Response<Body> {
        self.router()
            .oneshot(
                Request::get(uri)
                    .header("Range", range)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }
}

/// Root 0 layout:
///
/// ```text
/// beach.png     640x400, oldest, 2nd largest
/// Cat.png       32x32, newest
/// album/        empty directory
/// notes.txt     plain text, largest
/// ```
fn populate_photos(root: &Path) {
    let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000);

    write_file(root, "beach.png", &png_bytes(640, 400, [0, 100, 200]), base);
    write_file(
        root,
        "Cat.png",
        &png_bytes(32, 32, [250, 250, 0]),
        base + Duration::from_secs(3_000),
    );
    write_file(
        root,
        "notes.txt",
        &vec![b'x'; 64 * 1024],
        base + Duration::from_secs(1_000),
    );
    std::fs::create_dir(root.join("album")).unwrap();
}

/// Root 1 layout: `clip.mp4` with an ISO-BMFF signature followed by a
/// predictable byte pattern.
fn populate_videos(root: &Path) {
    let mut data = vec![0x00, 0x00, 0x00, 0x18];
    data.extend_from_slice(b"ftypisom");
    while data.len() < CLIP_SIZE {
        data.push((data.len() % 251) as u8);
    }
    write_file(root, "clip.mp4", &data, SystemTime::now());
}

fn write_file(dir: &Path, name: &str, data: &[u8], mtime: SystemTime) {
    let path = dir.join(name);
    std::fs::write(&path, data).unwrap();
    std::fs::File::options()
        .write(true)
        .open(&path)
        .unwrap()
        .set_modified(mtime)
        .unwrap();
}

pub fn png_bytes(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb(rgb));
    let mut buf = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

/// Helper to get response body as bytes
pub async fn body_bytes(body: Body) -> Bytes {
    body.collect().await.unwrap().to_bytes()
}

/// Helper to get response body as JSON
pub async fn body_json(body: Body) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(body).await).unwrap()
}
