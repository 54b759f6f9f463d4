//! Core type definitions for roots, listings, and byte ranges.
//!
//! Field names on the serialized types follow the JSON contract consumed
//! by the browser UI.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A configured root directory, addressed by its position in the config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootDirectory {
    /// Position of this root in the configured list.
    pub index: usize,
    /// Absolute path exactly as configured.
    pub path: PathBuf,
}

/// One child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// File or directory name.
    pub name: String,
    /// Whether the entry is a directory (symlinks are followed).
    pub is_dir: bool,
    /// Size in bytes as reported by the filesystem.
    pub size: u64,
    /// Modification time in whole seconds since the Unix epoch.
    pub mtime: i64,
    /// Path relative to the root, usable as the `p` parameter of later requests.
    pub rel_path: String,
}

/// Ordering applied to a directory listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Case-insensitive ascending by name.
    #[default]
    Name,
    /// Newest first.
    Date,
    /// Largest first.
    Size,
}

impl SortKey {
    /// Parse the `sort` query parameter. Missing or unknown values fall
    /// back to [`SortKey::Name`].
    pub fn from_query(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("date") => Self::Date,
            Some(v) if v.eq_ignore_ascii_case("size") => Self::Size,
            _ => Self::Name,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Date => write!(f, "date"),
            Self::Size => write!(f, "size"),
        }
    }
}

/// An inclusive span of a file's bytes.
///
/// Always satisfies `start <= end < total_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ByteRange {
    start: u64,
    end: u64,
    total_size: u64,
}

impl ByteRange {
    /// Build a range, returning `None` unless `start <= end < total_size`.
    pub fn new(start: u64, end: u64, total_size: u64) -> Option<Self> {
        (start <= end && end < total_size).then_some(Self {
            start,
            end,
            total_size,
        })
    }

    /// First byte offset (inclusive).
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Last byte offset (inclusive).
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Size of the whole file.
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Number of bytes covered by the range.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Value for the `Content-Range` header.
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.total_size)
    }
}
