//! Integration tests for the kmerpack library.
//!
//! These tests exercise whole workflows that span the corpus layout, the key
//! encoder and the task runner.

mod helpers;
mod test_encode_corpus;
mod test_runner_concurrency;
