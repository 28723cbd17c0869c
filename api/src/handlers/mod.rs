//! HTTP handlers
//!
//! Axum request handlers for the API endpoints.

pub mod feeds;

pub use feeds::{get_atom, get_json, get_rss, register_feed};
