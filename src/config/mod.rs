//! Configuration module for Site-Mirror
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key is optional; command-line flags override whatever the file sets.
//!
//! # Example
//!
//! ```no_run
//! use site_mirror::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("mirror.toml")).unwrap();
//! println!("Mirroring into: {}", config.output.root.display());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{
    compute_config_hash, compute_settings_hash, load_config, load_config_with_hash,
    parse_duration,
};
pub use validation::validate;
