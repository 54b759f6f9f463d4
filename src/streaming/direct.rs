//! Direct streaming with HTTP range requests.
//!
//! Serves files from disk as a full 200 body or a 206 partial body. Bodies
//! are read lazily in bounded chunks and never run past the computed length,
//! even if the file grows while it is being sent.

use std::path::Path;

use axum::{
    body::Body,
    extract::{Path as UrlPath, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
};
use mediashelf_common::{ByteRange, Error, Result};
use std::io::SeekFrom;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use crate::server::{AppContext, AppError};

/// What a request's `Range` header asks for, relative to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangePlan {
    /// No range requested: send the whole file with 200.
    Full,
    /// Send exactly this span with 206.
    Partial(ByteRange),
    /// The start lies beyond the end of the file: 416.
    Unsatisfiable,
}

/// Interpret a `Range` header against a file of `size` bytes.
///
/// Accepts `bytes=<start>-<end>` with either side optional. A missing start
/// means 0 and a missing end means the last byte; an overshooting end is
/// clamped. Anything unparsable is served as the whole file (still as a
/// partial response), so only a start at or past the end is rejected.
pub fn parse_range(header: Option<&str>, size: u64) -> RangePlan {
    let Some(header) = header else {
        return RangePlan::Full;
    };

    let last = size.saturating_sub(1);
    let (start, end) = parse_bounds(header, size).unwrap_or((0, last));

    // Fails exactly when start is at or past the end of the file.
    match ByteRange::new(start, end.min(last), size) {
        Some(range) => RangePlan::Partial(range),
        None => RangePlan::Unsatisfiable,
    }
}

/// Parse `bytes=<start>-<end>` into concrete bounds, `None` if malformed.
///
/// A range whose start is after its end counts as malformed.
fn parse_bounds(header: &str, size: u64) -> Option<(u64, u64)> {
    let (unit, ranges) = header.trim().split_once('=')?;
    if !unit.trim().eq_ignore_ascii_case("bytes") || ranges.contains('=') {
        return None;
    }

    let (start, end) = ranges.split_once('-')?;
    if end.contains('-') {
        return None;
    }

    let start = match start.trim() {
        "" => 0,
        s => parse_bound(s)?,
    };
    let end = match end.trim() {
        "" => size.saturating_sub(1),
        s => parse_bound(s)?,
    };

    if start > end && start < size {
        return None;
    }
    Some((start, end))
}

/// Parse one side of a range. Digit strings too large for `u64` saturate,
/// so an enormous start is unsatisfiable rather than malformed.
fn parse_bound(s: &str) -> Option<u64> {
    match s.parse::<u64>() {
        Ok(n) => Some(n),
        Err(_) if s.bytes().all(|b| b.is_ascii_digit()) => Some(u64::MAX),
        Err(_) => None,
    }
}

/// Stream a file, honouring an optional `Range` header.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if `path` is not an existing regular file.
pub async fn stream_file(
    path: &Path,
    range_header: Option<&str>,
    chunk_size: usize,
) -> Result<Response> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(m) if m.is_file() => m,
        _ => return Err(Error::not_found(path.display().to_string())),
    };
    let file_size = metadata.len();
    let content_type = mime_guess::from_path(path).first_or_octet_stream();

    match parse_range(range_header, file_size) {
        RangePlan::Full => {
            let file = open(path).await?;
            let stream = ReaderStream::with_capacity(file.take(file_size), chunk_size);

            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, content_type.as_ref())
                .header(header::CONTENT_LENGTH, file_size.to_string())
                .header(header::ACCEPT_RANGES, "bytes")
                .body(Body::from_stream(stream))
                .map_err(|e| Error::internal(format!("failed to build response: {e}")))
        }
        RangePlan::Partial(range) => {
            let mut file = open(path).await?;
            file.seek(SeekFrom::Start(range.start())).await?;

            // Take keeps the body at exactly `len` bytes.
            let stream = ReaderStream::with_capacity(file.take(range.len()), chunk_size);

            Response::builder()
                .status(StatusCode::PARTIAL_CONTENT)
                .header(header::CONTENT_TYPE, content_type.as_ref())
                .header(header::CONTENT_LENGTH, range.len().to_string())
                .header(header::CONTENT_RANGE, range.content_range())
                .header(header::ACCEPT_RANGES, "bytes")
                .body(Body::from_stream(stream))
                .map_err(|e| Error::internal(format!("failed to build response: {e}")))
        }
        RangePlan::Unsatisfiable => Response::builder()
            .status(StatusCode::RANGE_NOT_SATISFIABLE)
            .header(header::CONTENT_RANGE, format!("bytes */{file_size}"))
            .header(header::ACCEPT_RANGES, "bytes")
            .body(Body::empty())
            .map_err(|e| Error::internal(format!("failed to build response: {e}"))),
    }
}

/// Serve `/media/:root_index/*path` with range request support.
pub async fn serve_media(
    State(ctx): State<AppContext>,
    UrlPath((root_index, relative)): UrlPath<(usize, String)>,
    headers: HeaderMap,
) -> std::result::Result<Response, AppError> {
    let resolver = ctx.resolver.clone();
    let resolved = tokio::task::spawn_blocking(move || resolver.resolve(root_index, &relative))
        .await
        .map_err(|e| Error::internal(format!("resolve task failed: {e}")))??;

    let range = headers.get(header::RANGE).and_then(|h| h.to_str().ok());
    tracing::debug!(root_index, path = %resolved.path.display(), range, "Streaming media");

    Ok(stream_file(&resolved.path, range, ctx.config.streaming.chunk_size).await?)
}

async fn open(path: &Path) -> Result<File> {
    File::open(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::not_found(path.display().to_string()),
        _ => Error::Io(e),
    })
}
