//! Application layer
//!
//! Contains use cases and service orchestration.
//! Services coordinate between domain entities, ports, and the feed registry.

pub mod feed_registry;
pub mod feed_service;
pub mod feed_token;
pub mod pagination;
pub mod scanner_service;
pub mod scheduler;

pub use feed_registry::FeedRegistry;
pub use feed_service::FeedService;
pub use feed_token::FeedTokenCodec;
pub use scanner_service::{ScanPolicy, ScannerService};
pub use scheduler::spawn_scheduler;
