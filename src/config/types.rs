use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    /// Absolute paths of the directories exposed to clients, in index order.
    #[serde(default)]
    pub roots: Vec<PathBuf>,

    #[serde(default)]
    pub thumbnails: ThumbnailConfig,

    #[serde(default)]
    pub streaming: StreamingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the browser UI bundle, served as an SPA fallback.
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ThumbnailConfig {
    /// Maximum thumbnail width in pixels.
    #[serde(default = "default_thumb_width")]
    pub width: u32,

    /// Maximum thumbnail height in pixels.
    #[serde(default = "default_thumb_height")]
    pub height: u32,

    /// JPEG quality (1-100).
    #[serde(default = "default_quality")]
    pub quality: u8,

    /// RGB colour of the placeholder returned when generation fails.
    #[serde(default = "default_placeholder_color")]
    pub placeholder_color: [u8; 3],

    /// Playback position the video frame is taken from.
    #[serde(default = "default_frame_offset")]
    pub frame_offset_secs: f64,

    /// Upper bound on a single frame extraction.
    #[serde(default = "default_extractor_timeout")]
    pub extractor_timeout_secs: u64,

    /// Explicit ffmpeg binary; looked up on PATH when unset.
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    /// Number of leading bytes inspected to classify a file.
    #[serde(default = "default_sniff_bytes")]
    pub sniff_bytes: usize,

    /// Maximum number of cached thumbnails (unbounded when unset).
    #[serde(default)]
    pub cache_capacity: Option<usize>,
}

fn default_thumb_width() -> u32 {
    320
}
fn default_thumb_height() -> u32 {
    200
}
fn default_quality() -> u8 {
    80
}
fn default_placeholder_color() -> [u8; 3] {
    [40, 40, 40]
}
fn default_frame_offset() -> f64 {
    3.0
}
fn default_extractor_timeout() -> u64 {
    15
}
fn default_sniff_bytes() -> usize {
    2048
}

impl ThumbnailConfig {
    pub fn extractor_timeout(&self) -> Duration {
        Duration::from_secs(self.extractor_timeout_secs)
    }

    /// Zero if `frame_offset_secs` is not representable as a duration.
    pub fn frame_offset(&self) -> Duration {
        Duration::try_from_secs_f64(self.frame_offset_secs).unwrap_or_default()
    }
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            width: default_thumb_width(),
            height: default_thumb_height(),
            quality: default_quality(),
            placeholder_color: default_placeholder_color(),
            frame_offset_secs: default_frame_offset(),
            extractor_timeout_secs: default_extractor_timeout(),
            ffmpeg_path: None,
            sniff_bytes: default_sniff_bytes(),
            cache_capacity: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StreamingConfig {
    /// Read buffer size for streamed bodies, in bytes.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

fn default_chunk_size() -> usize {
    1 << 20
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
        }
    }
}
