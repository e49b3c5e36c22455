//! Document discovery and loading.
//!
//! Walks the source directory and yields every file whose root-relative path
//! matches the configured glob pattern:
//!
//! ```text
//! chapters/                     pattern "**/*.md"
//! ├── config.toml               skipped (no match)
//! ├── 01-intro.md               ✓
//! ├── 01-intro/
//! │   ├── pure-functions.md     ✓
//! │   └── values.md             ✓
//! └── .drafts/                  skipped (hidden)
//!     └── scratch.md
//! ```
//!
//! A pattern without a `/` matches against the file name alone, so `*.md`
//! finds markdown at any depth.
//!
//! Discovery order is deterministic: entries are visited sorted by file name.
//! The aggregation fold depends on this order, since it decides which document
//! wins an id collision.
//!
//! Unreadable directory entries and unreadable files are reported one by one
//! and never stop the scan.

use glob::{MatchOptions, Pattern};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Source directory not found: {0}")]
    MissingRoot(PathBuf),
    #[error("Invalid document pattern {pattern:?}: {error}")]
    Pattern {
        pattern: String,
        error: glob::PatternError,
    },
    #[error("Cannot scan {}: {error}", .path.display())]
    Walk {
        path: PathBuf,
        error: walkdir::Error,
    },
    #[error("Cannot read {}: {error}", .path.display())]
    Read {
        path: PathBuf,
        error: std::io::Error,
    },
}

impl SourceError {
    /// The file or directory this error is about, when known.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::MissingRoot(path) | Self::Walk { path, .. } | Self::Read { path, .. } => {
                Some(path)
            }
            Self::Pattern { .. } => None,
        }
    }
}

/// A source file and its text.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub path: PathBuf,
    pub content: String,
}

/// Result of walking the source directory.
#[derive(Debug, Default)]
pub struct Discovered {
    /// Matching files in discovery order.
    pub paths: Vec<PathBuf>,
    /// Entries that could not be visited.
    pub failures: Vec<SourceError>,
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Find candidate documents under `root`.
///
/// Fails only when `root` is not a directory or the pattern is malformed.
pub fn discover(root: &Path, pattern: &str) -> Result<Discovered, SourceError> {
    if !root.is_dir() {
        return Err(SourceError::MissingRoot(root.to_path_buf()));
    }
    let matcher = Pattern::new(pattern).map_err(|error| SourceError::Pattern {
        pattern: pattern.to_string(),
        error,
    })?;
    let match_base = !pattern.contains('/');

    let mut discovered = Discovered::default();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                let path = error.path().unwrap_or(root).to_path_buf();
                tracing::warn!(path = %path.display(), "skipping unreadable entry: {error}");
                discovered.failures.push(SourceError::Walk { path, error });
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let candidate = if match_base {
            PathBuf::from(entry.file_name())
        } else {
            relative.to_path_buf()
        };
        if matcher.matches_path_with(&candidate, MATCH_OPTIONS) {
            discovered.paths.push(entry.into_path());
        }
    }

    tracing::debug!(
        root = %root.display(),
        pattern,
        found = discovered.paths.len(),
        "discovered documents"
    );
    Ok(discovered)
}

/// Read one document as UTF-8 text.
pub fn read(path: &Path) -> Result<RawDocument, SourceError> {
    let content = fs::read_to_string(path).map_err(|error| SourceError::Read {
        path: path.to_path_buf(),
        error,
    })?;
    Ok(RawDocument {
        path: path.to_path_buf(),
        content,
    })
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}
