//! Helper utilities for integration tests.

pub mod corpus;

pub use corpus::*;
