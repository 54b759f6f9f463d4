//! Sandboxed access to the configured root directories.
//!
//! Every request first goes through [`PathResolver`], which proves that the
//! requested location lies inside its root. Listings are produced by
//! [`list_directory`] from an already resolved path.

mod lister;
mod resolver;

pub use lister::list_directory;
pub use resolver::{PathResolver, ResolvedPath};
