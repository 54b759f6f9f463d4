//! Thumbnail generation and caching.
//!
//! Images are decoded and shrunk in-process; anything else is treated as a
//! potential video and handed to a [`FrameExtractor`]. Results are kept in
//! a [`ThumbnailCache`] for the lifetime of the process.

mod cache;
mod frame;
mod render;
mod service;
mod sniff;

pub use cache::{ThumbnailCache, ThumbnailKey};
pub use frame::{FfmpegFrameExtractor, FrameExtractor};
pub use render::{placeholder_jpeg, render_thumbnail};
pub use service::ThumbnailService;
pub use sniff::{classify_bytes, MimeSniffer, PrefixSniffer};
