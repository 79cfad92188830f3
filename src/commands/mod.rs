//! CLI command implementations for kmerpack.
//!
//! - [`encode`] - Simulate a packed corpus and encode every window into k-mer keys
//! - [`partition`] - Split a range into overlapping blocks and report page alignment

// Blanket clippy pedantic allows for command implementations.
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc
)]

pub mod command;
pub mod common;
pub mod encode;
pub mod partition;
