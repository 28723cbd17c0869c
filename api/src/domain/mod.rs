//! Domain layer
//!
//! Contains pure business logic with no external dependencies.
//! - `entities`: Tracked repositories, comment state and feeds
//! - `ports`: Trait definitions for external dependencies

pub mod entities;
pub mod ports;
