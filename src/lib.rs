//! Mediashelf - self-hosted media browsing server
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod library;
pub mod server;
pub mod streaming;
pub mod thumbnails;
pub mod tools;
