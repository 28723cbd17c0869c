//! Feed module
//!
//! Syndication rendering of feed snapshots.

pub mod renderer;

pub use renderer::{
    render_atom, render_json, render_rss, ATOM_CONTENT_TYPE, JSON_CONTENT_TYPE, RSS_CONTENT_TYPE,
};
