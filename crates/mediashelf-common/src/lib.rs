//! Mediashelf-Common: Shared types, errors, and path utilities.
//!
//! This crate provides the pieces shared between the resolver, the listing
//! and thumbnail services, and the HTTP layer:
//!
//! - **Error Handling**: The error kinds surfaced by every operation
//! - **Core Types**: Root directories, listing entries, sort keys, byte ranges
//! - **Path Utilities**: Relative-path joining and containment checks
//!
//! # Examples
//!
//! ```
//! use mediashelf_common::{Error, Result, SortKey};
//! use mediashelf_common::paths::join_relative;
//!
//! assert_eq!(SortKey::from_query(Some("size")), SortKey::Size);
//! assert_eq!(join_relative("photos", "cat.jpg"), "photos/cat.jpg");
//!
//! fn example() -> Result<()> {
//!     Err(Error::not_found("photos/cat.jpg"))
//! }
//! assert!(example().is_err());
//! ```

pub mod error;
pub mod paths;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
