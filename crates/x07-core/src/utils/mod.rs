//! Utility functions and helpers.
//!
//! Pure functionality used across multiple x07 crates. Nothing in here
//! performs I/O.

pub mod json;
pub mod name;

// Re-export commonly used utilities
pub use json::canonical_json;
pub use name::{index_relative_path, is_official_package, validate_package_name};
