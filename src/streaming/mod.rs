//! Media streaming module.
//!
//! Provides direct file streaming with HTTP range support so media players
//! can seek.
//!
//! # Routes
//!
//! - `GET /media/{root_index}/{path}` - Direct file streaming with range support

mod direct;

pub use direct::{parse_range, serve_media, stream_file, RangePlan};

use axum::{routing::get, Router};

use crate::server::AppContext;

/// Create direct streaming router.
pub fn media_router() -> Router<AppContext> {
    Router::new().route("/:root_index/*path", get(serve_media))
}
