//! Content-based file classification.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Classifies a file's content kind from its leading bytes.
pub trait MimeSniffer: Send + Sync {
    /// Return a MIME type string for the file at `path`.
    ///
    /// Implementations read only a bounded prefix of the file and may block.
    fn classify(&self, path: &Path) -> io::Result<String>;
}

/// Sniffer that inspects at most `prefix_len` leading bytes.
///
/// Still images are recognised through the `image` crate's signature table;
/// common video containers through their magic numbers.
#[derive(Debug, Clone)]
pub struct PrefixSniffer {
    prefix_len: usize,
}

impl PrefixSniffer {
    pub fn new(prefix_len: usize) -> Self {
        Self { prefix_len }
    }
}

impl MimeSniffer for PrefixSniffer {
    fn classify(&self, path: &Path) -> io::Result<String> {
        let mut prefix = Vec::with_capacity(self.prefix_len);
        File::open(path)?
            .take(self.prefix_len as u64)
            .read_to_end(&mut prefix)?;
        Ok(classify_bytes(&prefix).to_string())
    }
}

const OCTET_STREAM: &str = "application/octet-stream";

/// Classify a byte prefix.
pub fn classify_bytes(prefix: &[u8]) -> &'static str {
    if let Ok(format) = image::guess_format(prefix) {
        return format.to_mime_type();
    }
    video_mime(prefix).unwrap_or(OCTET_STREAM)
}

fn video_mime(prefix: &[u8]) -> Option<&'static str> {
    if prefix.len() >= 12 && &prefix[4..8] == b"ftyp" {
        return Some(match &prefix[8..12] {
            b"qt  " => "video/quicktime",
            _ => "video/mp4",
        });
    }
    if prefix.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        let is_webm = prefix.windows(4).any(|w| w == b"webm");
        return Some(if is_webm { "video/webm" } else { "video/x-matroska" });
    }
    if prefix.len() >= 12 && &prefix[0..4] == b"RIFF" && &prefix[8..12] == b"AVI " {
        return Some("video/x-msvideo");
    }
    if prefix.starts_with(b"OggS") {
        return Some("video/ogg");
    }
    if prefix.starts_with(&[0x00, 0x00, 0x01, 0xBA]) {
        return Some("video/mpeg");
    }
    // MPEG-TS: sync byte repeated every 188 bytes.
    if prefix.len() > 188 && prefix[0] == 0x47 && prefix[188] == 0x47 {
        return Some("video/mp2t");
    }
    if prefix.starts_with(&[0x30, 0x26, 0xB2, 0x75]) {
        return Some("video/x-ms-wmv");
    }
    None
}
