//! Application settings for the configuration tool
//!
//! Stored as JSON under the user's config directory, created with defaults
//! on first run. Command-line flags override file values.

pub mod settings;

pub use settings::AppSettings;
