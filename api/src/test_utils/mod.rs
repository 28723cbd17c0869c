//! Test utilities
//!
//! Manual mock implementations and test fixtures for unit testing.
//!
//! The mock GitHub client pages through in-memory data the same way the
//! real API does, so scan tests exercise the real pagination path.

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
