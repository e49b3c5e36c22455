//! Writing pages to the output directory.
//!
//! ```text
//! docs/
//! ├── styles.css
//! ├── intro.html            slug "intro"
//! ├── intro/
//! │   └── pure.html         slug "pure", parent "intro"
//! └── types.html
//! ```

use crate::view_model::ViewChapter;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Cannot create directory {}: {error}", .path.display())]
    CreateDir {
        path: PathBuf,
        error: std::io::Error,
    },
    #[error("Cannot write {}: {error}", .path.display())]
    Write {
        path: PathBuf,
        error: std::io::Error,
    },
    #[error("Output path escapes the output directory: {}", .0.display())]
    Escapes(PathBuf),
}

/// Destination for rendered pages. Shared across emit workers.
pub trait SiteWriter: Sync {
    /// Create `dir` and its ancestors. Succeeds if it already exists.
    fn ensure_dir(&self, dir: &Path) -> Result<(), WriteError>;
    /// Write `contents` to `path`, replacing any existing file.
    fn write(&self, path: &Path, contents: &str) -> Result<(), WriteError>;
}

/// Writes straight to the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsWriter;

impl SiteWriter for FsWriter {
    fn ensure_dir(&self, dir: &Path) -> Result<(), WriteError> {
        fs::create_dir_all(dir).map_err(|error| WriteError::CreateDir {
            path: dir.to_path_buf(),
            error,
        })
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), WriteError> {
        fs::write(path, contents).map_err(|error| WriteError::Write {
            path: path.to_path_buf(),
            error,
        })
    }
}

/// Where a chapter's page goes: `{output}/{parent}/{slug}.html`.
///
/// Slugs and parents come from user-authored front-matter, so anything that
/// would land outside `output_dir` is rejected. A document whose front-matter
/// fell back to defaults has an empty slug and is written to `.html`.
pub fn page_path(output_dir: &Path, chapter: &ViewChapter) -> Result<PathBuf, WriteError> {
    let relative = PathBuf::from(&chapter.href);
    let escapes = relative.components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes {
        return Err(WriteError::Escapes(relative));
    }
    Ok(output_dir.join(relative))
}
