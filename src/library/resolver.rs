//! Root-relative path resolution with containment checks.

use std::path::{Component, Path, PathBuf};

use mediashelf_common::paths::is_within;
use mediashelf_common::{Error, Result, RootDirectory};

/// A canonical location proven to lie inside one of the configured roots.
///
/// The path may not exist; callers check existence and type themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Index of the root this path belongs to.
    pub root_index: usize,
    /// The relative path exactly as requested.
    pub relative: String,
    /// Canonical absolute location.
    pub path: PathBuf,
}

/// Resolves `(root index, relative path)` pairs against the configured roots.
///
/// The root list is fixed for the lifetime of the resolver.
#[derive(Debug, Clone)]
pub struct PathResolver {
    roots: Vec<PathBuf>,
}

impl PathResolver {
    /// Create a resolver over the given root directories.
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// All configured roots with their indices.
    pub fn roots(&self) -> Vec<RootDirectory> {
        self.roots
            .iter()
            .enumerate()
            .map(|(index, path)| RootDirectory {
                index,
                path: path.clone(),
            })
            .collect()
    }

    /// Resolve `relative` inside the root at `root_index`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidRoot`] if the index is out of bounds.
    /// - [`Error::PathEscape`] if the canonical result is not inside the
    ///   canonical root, whether through `..` segments, an absolute
    ///   relative path, or a symlink pointing elsewhere.
    pub fn resolve(&self, root_index: usize, relative: &str) -> Result<ResolvedPath> {
        let root = self
            .roots
            .get(root_index)
            .ok_or(Error::InvalidRoot(root_index))?;

        let canonical_root = canonicalize_lenient(root)?;
        let candidate = canonicalize_lenient(&root.join(relative))?;

        if !is_within(&candidate, &canonical_root) {
            tracing::debug!(
                root_index,
                relative,
                candidate = %candidate.display(),
                "Rejected path outside root"
            );
            return Err(Error::path_escape(relative));
        }

        Ok(ResolvedPath {
            root_index,
            relative: relative.to_string(),
            path: candidate,
        })
    }
}

/// Canonicalize a path that may not fully exist.
///
/// Components are walked one at a time. After each name is appended the
/// prefix is canonicalized, which resolves symlinks; once a prefix cannot be
/// canonicalized (it does not exist) the rest is applied lexically. `..` pops
/// the already canonical prefix, so it never re-enters an unresolved symlink.
fn canonicalize_lenient(path: &Path) -> Result<PathBuf> {
    let mut resolved = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => resolved.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Normal(name) => {
                resolved.push(name);
                if let Ok(real) = std::fs::canonicalize(&resolved) {
                    resolved = real;
                }
            }
        }
    }

    if resolved.as_os_str().is_empty() {
        return Err(Error::internal(format!(
            "cannot resolve relative root path {}",
            path.display()
        )));
    }

    Ok(resolved)
}
