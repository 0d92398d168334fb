//! Configuration module for Review-Mirror
//!
//! Configuration is read once at process start: an optional TOML file,
//! then command-line overrides, then validation. Nothing is reconfigured
//! while a run is in progress.
//!
//! # Example
//!
//! ```no_run
//! use review_mirror::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("mirror.toml")).unwrap();
//! println!("Mirroring {} listing pages", config.target.pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BrowserConfig, CaptureConfig, Config, ConsentConfig, OutputConfig, TargetConfig,
    DEFAULT_ACCOUNT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;

use std::path::PathBuf;

/// Values supplied on the command line, applied over the file configuration
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub account: Option<String>,
    pub pages: Option<u32>,
    pub output_root: Option<PathBuf>,
    pub summary_path: Option<PathBuf>,
}

impl Config {
    /// Applies command-line overrides on top of this configuration
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(account) = overrides.account {
            self.target.account = account;
        }
        if let Some(pages) = overrides.pages {
            self.target.pages = pages;
        }
        if let Some(root) = overrides.output_root {
            self.output.root = root;
        }
        if let Some(summary) = overrides.summary_path {
            self.output.summary_path = Some(summary);
        }
    }
}
