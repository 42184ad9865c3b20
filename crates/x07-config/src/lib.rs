//! Configuration for the x07 sparse-index client
//!
//! This crate validates the bootstrap document served by a registry web
//! origin, layers client settings from file, environment and command line,
//! and persists the single credential string the CLI keeps between runs.

pub mod credentials;
pub mod runtime;
pub mod settings;

// Re-export main types
pub use credentials::TokenStore;
pub use runtime::{RuntimeConfig, RUNTIME_CONFIG_PATH, RUNTIME_CONFIG_SCHEMA};
pub use settings::{AuthStrategy, Settings, SettingsLayering, SettingsLoader};

use x07_core::error::ApiError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ApiError>;
