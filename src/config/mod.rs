//! Configuration module for skimmer
//!
//! This module handles loading, parsing, and validating TOML settings files.
//!
//! # Example
//!
//! ```no_run
//! use skimmer::config::load_config;
//! use std::path::Path;
//!
//! let settings = load_config(Path::new("settings.toml")).unwrap();
//! println!("Seeds configured: {}", settings.seeds.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{RunnerSettings, SeedEntry, Settings, SinkSettings};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
