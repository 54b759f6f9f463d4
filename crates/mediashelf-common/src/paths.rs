//! Path utilities shared by the resolver and the directory lister.

use std::path::Path;

/// Join a listing's relative path with a child name.
///
/// Mirrors how the browser UI builds follow-up requests: an empty parent
/// yields just the name, and any leading separators are stripped.
///
/// # Examples
///
/// ```
/// use mediashelf_common::paths::join_relative;
///
/// assert_eq!(join_relative("", "a.jpg"), "a.jpg");
/// assert_eq!(join_relative("trips/2024/", "a.jpg"), "trips/2024/a.jpg");
/// assert_eq!(join_relative("/trips", "a.jpg"), "trips/a.jpg");
/// ```
pub fn join_relative(parent: &str, name: &str) -> String {
    let joined = if parent.is_empty() || parent.ends_with('/') {
        format!("{parent}{name}")
    } else {
        format!("{parent}/{name}")
    };
    joined.trim_start_matches('/').to_string()
}

/// Check whether `candidate` lies inside (or is) `root`.
///
/// The comparison is per path component, so `/data2` is not inside `/data`.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use mediashelf_common::paths::is_within;
///
/// assert!(is_within(Path::new("/data/photos"), Path::new("/data")));
/// assert!(is_within(Path::new("/data"), Path::new("/data")));
/// assert!(!is_within(Path::new("/data2/photos"), Path::new("/data")));
/// ```
pub fn is_within(candidate: &Path, root: &Path) -> bool {
    candidate.starts_with(root)
}
