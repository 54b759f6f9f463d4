//! Thumbnail service coordinating resolution, classification, rendering,
//! and caching.
//!
//! Generation never fails outward: any decode, subprocess, or timeout error
//! is logged and replaced by the placeholder image. The only error callers
//! see (besides strict path resolution errors) is a missing source file.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use bytes::Bytes;

use super::cache::{ThumbnailCache, ThumbnailKey};
use super::frame::FrameExtractor;
use super::render::{placeholder_jpeg, render_thumbnail};
use super::sniff::MimeSniffer;
use crate::config::ThumbnailConfig;
use crate::library::PathResolver;

/// High-level thumbnail service.
pub struct ThumbnailService {
    resolver: Arc<PathResolver>,
    cache: Arc<ThumbnailCache>,
    sniffer: Arc<dyn MimeSniffer>,
    extractor: Arc<dyn FrameExtractor>,
    settings: Arc<ThumbnailConfig>,
    placeholder: Bytes,
}

impl ThumbnailService {
    /// Create a new `ThumbnailService`.
    ///
    /// The placeholder is encoded up front, so an unusable configuration is
    /// reported here rather than on a request.
    pub fn new(
        resolver: Arc<PathResolver>,
        cache: Arc<ThumbnailCache>,
        sniffer: Arc<dyn MimeSniffer>,
        extractor: Arc<dyn FrameExtractor>,
        settings: ThumbnailConfig,
    ) -> Result<Self> {
        let placeholder =
            placeholder_jpeg(&settings).context("Failed to encode placeholder thumbnail")?;
        Ok(Self {
            resolver,
            cache,
            sniffer,
            extractor,
            settings: Arc::new(settings),
            placeholder,
        })
    }

    /// The cache backing this service.
    pub fn cache(&self) -> &Arc<ThumbnailCache> {
        &self.cache
    }

    /// The fallback image returned when generation fails.
    pub fn placeholder(&self) -> &Bytes {
        &self.placeholder
    }

    /// Return JPEG thumbnail bytes for a root-relative path.
    ///
    /// # Errors
    ///
    /// - Resolution errors ([`InvalidRoot`], [`PathEscape`]) from the
    ///   [`PathResolver`].
    /// - [`NotFound`] if the source does not exist.
    ///
    /// [`InvalidRoot`]: mediashelf_common::Error::InvalidRoot
    /// [`PathEscape`]: mediashelf_common::Error::PathEscape
    /// [`NotFound`]: mediashelf_common::Error::NotFound
    pub async fn get_thumbnail(
        &self,
        root_index: usize,
        relative: &str,
    ) -> mediashelf_common::Result<Bytes> {
        let key = ThumbnailKey::new(root_index, relative);
        if let Some(bytes) = self.cache.get(&key) {
            tracing::debug!(root_index, relative, "Thumbnail cache hit");
            return Ok(bytes);
        }

        let resolver = Arc::clone(&self.resolver);
        let rel = relative.to_string();
        let (path, is_file) = tokio::task::spawn_blocking(
            move || -> mediashelf_common::Result<(PathBuf, bool)> {
                let resolved = resolver.resolve(root_index, &rel)?;
                match std::fs::metadata(&resolved.path) {
                    Ok(meta) => Ok((resolved.path, meta.is_file())),
                    Err(e)
                        if matches!(
                            e.kind(),
                            std::io::ErrorKind::NotFound | std::io::ErrorKind::NotADirectory
                        ) =>
                    {
                        Err(mediashelf_common::Error::not_found(rel))
                    }
                    // Unreadable sources get the placeholder.
                    Err(e) => {
                        tracing::debug!(relative = %rel, error = %e, "Cannot stat thumbnail source");
                        Ok((resolved.path, false))
                    }
                }
            },
        )
        .await
        .map_err(|e| mediashelf_common::Error::internal(format!("resolve task failed: {e}")))??;

        let bytes = self
            .cache
            .get_or_generate(key, || async move {
                tracing::debug!(root_index, relative, "Generating thumbnail");
                if !is_file {
                    return self.placeholder.clone();
                }
                match self.generate(path).await {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::warn!(root_index, relative, error = %e, "Thumbnail generation failed, using placeholder");
                        self.placeholder.clone()
                    }
                }
            })
            .await;

        Ok(bytes)
    }

    async fn generate(&self, path: PathBuf) -> Result<Bytes> {
        let sniffer = Arc::clone(&self.sniffer);
        let sniff_path = path.clone();
        let mime = tokio::task::spawn_blocking(move || sniffer.classify(&sniff_path))
            .await?
            .with_context(|| format!("Failed to sniff {}", path.display()))?;

        let settings = Arc::clone(&self.settings);
        if mime.starts_with("image/") {
            return tokio::task::spawn_blocking(move || {
                let data = std::fs::read(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                render_thumbnail(&data, &settings)
            })
            .await?;
        }

        tracing::debug!(path = %path.display(), mime = %mime, "Extracting video frame");
        let frame = self
            .extractor
            .extract_frame(
                &path,
                settings.frame_offset(),
                settings.width,
                settings.extractor_timeout(),
            )
            .await?;

        tokio::task::spawn_blocking(move || render_thumbnail(&frame, &settings)).await?
    }
}
