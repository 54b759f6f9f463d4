//! Directory listing with search and sorting.

use std::cmp::Reverse;
use std::time::UNIX_EPOCH;

use mediashelf_common::paths::join_relative;
use mediashelf_common::{DirectoryEntry, Error, Result, SortKey};

use super::ResolvedPath;

/// List the immediate children of a resolved directory.
///
/// `search` keeps only entries whose name contains it, ignoring case.
/// The output order depends only on the entries and `sort`.
///
/// This performs blocking filesystem calls; async callers should run it on
/// the blocking pool.
///
/// # Errors
///
/// - [`Error::NotFound`] if the path does not exist.
/// - [`Error::NotADirectory`] if the path exists but is not a directory.
pub fn list_directory(
    dir: &ResolvedPath,
    search: Option<&str>,
    sort: SortKey,
) -> Result<Vec<DirectoryEntry>> {
    let metadata = match std::fs::metadata(&dir.path) {
        Ok(m) => m,
        // A path below a regular file fails with ENOTDIR; it does not exist either.
        Err(e) if is_missing(&e) => return Err(Error::not_found(&dir.relative)),
        Err(e) => return Err(e.into()),
    };
    if !metadata.is_dir() {
        return Err(Error::not_a_directory(&dir.relative));
    }

    let needle = search
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut entries = Vec::new();
    for child in std::fs::read_dir(&dir.path)? {
        let child = child?;
        let name = child.file_name().to_string_lossy().into_owned();

        if let Some(ref needle) = needle {
            if !name.to_lowercase().contains(needle) {
                continue;
            }
        }

        // Follows symlinks; a dangling link has no metadata to report.
        let meta = match std::fs::metadata(child.path()) {
            Ok(m) => m,
            Err(e) => {
                tracing::debug!(name = %name, error = %e, "Skipping unreadable entry");
                continue;
            }
        };

        let mtime = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);

        entries.push(DirectoryEntry {
            rel_path: join_relative(&dir.relative, &name),
            name,
            is_dir: meta.is_dir(),
            size: meta.len(),
            mtime,
        });
    }

    sort_entries(&mut entries, sort);
    Ok(entries)
}

/// Order entries by `sort`. Entries are first put in exact-name order so
/// ties are broken the same way regardless of `read_dir` order.
fn is_missing(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        std::io::ErrorKind::NotFound | std::io::ErrorKind::NotADirectory
    )
}

fn sort_entries(entries: &mut [DirectoryEntry], sort: SortKey) {
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    match sort {
        SortKey::Name => entries.sort_by_cached_key(|e| e.name.to_lowercase()),
        SortKey::Date => entries.sort_by_key(|e| Reverse(e.mtime)),
        SortKey::Size => entries.sort_by_key(|e| Reverse(e.size)),
    }
}
