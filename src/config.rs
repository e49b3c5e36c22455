//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. The file lives in
//! the source root next to the chapters and overrides the stock defaults:
//!
//! ```text
//! chapters/
//! ├── config.toml              # Site config (optional)
//! ├── 01-intro.md
//! └── 01-intro/
//!     └── pure-functions.md
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! title = "Chapters"              # Site title (page <title> and heading)
//! nav_heading = "Jump To Chapter" # Heading above the chapter list
//! pattern = "**/*.md"             # Which files are chapters
//! base_href = "/"                 # <base href> for production builds
//! stylesheet = "styles.css"       # Stylesheet written to the output root
//! strict = false                  # Fail the build on invalid front-matter
//!
//! [processing]
//! max_processes = 4               # Max parallel page writers (omit for auto)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! title = "A Workers Guide To Typed Functional Programming"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site title, used for `<title>` and the page heading.
    pub title: String,
    /// Heading shown above the navigation list.
    pub nav_heading: String,
    /// Glob selecting chapter files, relative to the source directory.
    pub pattern: String,
    /// `<base href>` emitted in production builds.
    pub base_href: String,
    /// File name of the stylesheet written to the output root.
    pub stylesheet: String,
    /// Treat invalid front-matter as a fatal error.
    pub strict: bool,
    /// Parallel output settings.
    pub processing: ProcessingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Chapters".to_string(),
            nav_heading: "Jump To Chapter".to_string(),
            pattern: "**/*.md".to_string(),
            base_href: "/".to_string(),
            stylesheet: "styles.css".to_string(),
            strict: false,
            processing: ProcessingConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pattern.trim().is_empty() {
            return Err(ConfigError::Validation("pattern must not be empty".into()));
        }
        if self.stylesheet.is_empty()
            || self.stylesheet.contains(['/', '\\'])
            || self.stylesheet.starts_with('.')
        {
            return Err(ConfigError::Validation(
                "stylesheet must be a plain file name".into(),
            ));
        }
        if !self.base_href.ends_with('/') {
            return Err(ConfigError::Validation(
                "base_href must end with '/'".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Parallel output settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of pages rendered and written in parallel.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// Base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match load_raw_config(root)? {
        Some(overlay) => merge_toml(base, overlay),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    tracing::debug!(root = %root.display(), "loaded site config");
    Ok(config)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Chapterhouse Configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file in the source directory, next to your chapters.
# Unknown keys will cause an error.

# Site title, used for the page <title> and the heading on every page.
title = "Chapters"

# Heading shown above the chapter navigation.
nav_heading = "Jump To Chapter"

# Glob selecting chapter files, relative to the source directory.
# A pattern without '/' matches file names at any depth.
pattern = "**/*.md"

# <base href> emitted in production builds, for sites served from a
# sub-path (e.g. "/my-guide/"). Preview builds use relative links.
base_href = "/"

# File name of the stylesheet written to the output root.
stylesheet = "styles.css"

# When true, a chapter with invalid front-matter fails the build instead
# of being rendered with default values.
strict = false

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum pages rendered and written in parallel.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
