//! x07 benchmarking suite
//!
//! Benchmarks for the pure hot paths of the client: index path sharding,
//! index file parsing, response decoding and version selection.

pub mod common;

pub use common::*;
