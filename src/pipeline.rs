//! Build orchestration.
//!
//! Two phases, run one after the other:
//!
//! ```text
//! collect   discover → read → parse → validate → identify → filter → fold
//!           (sequential, discovery order)                          │
//!                                                                  ▼
//!                                                             ViewModel
//!                                                                  │
//! emit      for each id: page path → render → ensure dir → write  ◀┘
//!           (parallel, bounded rayon pool)
//! ```
//!
//! Collect is sequential because the fold order decides id collisions and
//! tie-breaks in the navigation. Emit only reads the finished model, so pages
//! are rendered and written in parallel.
//!
//! Failures are contained where they happen. An unreadable file, invalid
//! front-matter (outside strict mode), an id collision or a placeholder
//! section becomes a [`Diagnostic`]. A page that cannot be written shows up
//! in [`EmitReport::failed`] and its siblings are still written. Only a
//! missing source directory, a strict-mode violation or a broken output root
//! stop the build.

use crate::config::{self, SiteConfig};
use crate::frontmatter::{self, FrontmatterError, Violation};
use crate::identity::ChapterId;
use crate::lifecycle::{self, BuildMode, LifecycleState};
use crate::parse;
use crate::render::{PageRenderer, SiteRenderer};
use crate::source::{self, SourceError};
use crate::view_model::{Chapter, Collision, ViewChapter, ViewModel};
use crate::writer::{self, FsWriter, SiteWriter, WriteError};
use rayon::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Stylesheet used when the source directory does not provide one.
const DEFAULT_STYLESHEET: &str = include_str!("../static/styles.css");

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    InvalidFrontmatter(#[from] FrontmatterError),
    #[error(transparent)]
    Write(#[from] WriteError),
    #[error("Cannot start page workers: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// A recoverable problem found while collecting.
#[derive(Debug)]
pub enum Diagnostic {
    Unreadable(SourceError),
    InvalidFrontmatter {
        path: PathBuf,
        violations: Vec<Violation>,
    },
    Collision(Collision),
    OrphanedSection(ChapterId),
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreadable(error) => write!(f, "{error}"),
            Self::InvalidFrontmatter { path, violations } => {
                let lines: Vec<String> = violations.iter().map(|v| v.report(path)).collect();
                f.write_str(&lines.join("\n"))
            }
            Self::Collision(c) => write!(
                f,
                "Chapter id {} is defined twice: {} replaces {}",
                c.id,
                c.winner.display(),
                c.shadowed.display()
            ),
            Self::OrphanedSection(id) => {
                write!(f, "Section {id} has chapters but no document of its own")
            }
        }
    }
}

/// A document left out by the lifecycle filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejected {
    pub path: PathBuf,
    pub id: ChapterId,
    pub state: LifecycleState,
}

/// Everything the collect phase learned about the source directory.
#[derive(Debug)]
pub struct Collection {
    pub model: ViewModel,
    /// Admitted documents in fold order.
    pub admitted: Vec<PathBuf>,
    pub rejected: Vec<Rejected>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Run discovery, validation, filtering and aggregation.
pub fn collect(
    source_root: &Path,
    config: &SiteConfig,
    mode: BuildMode,
) -> Result<Collection, BuildError> {
    tracing::info!(source = %source_root.display(), %mode, "collecting chapters");
    let discovered = source::discover(source_root, &config.pattern)?;

    let mut diagnostics: Vec<Diagnostic> = discovered
        .failures
        .into_iter()
        .map(Diagnostic::Unreadable)
        .collect();
    let mut model = ViewModel::default();
    let mut admitted = Vec::new();
    let mut rejected = Vec::new();

    for path in &discovered.paths {
        let raw = match source::read(path) {
            Ok(raw) => raw,
            Err(error) => {
                tracing::warn!("{error}");
                diagnostics.push(Diagnostic::Unreadable(error));
                continue;
            }
        };
        let parsed = parse::parse(&raw);

        let validated = frontmatter::validate(&parsed.frontmatter);
        let fm = if config.strict {
            validated.into_strict(path.clone())?
        } else {
            if !validated.is_valid() {
                for violation in validated.violations() {
                    tracing::warn!("{}", violation.report(path));
                }
                diagnostics.push(Diagnostic::InvalidFrontmatter {
                    path: path.clone(),
                    violations: validated.violations().to_vec(),
                });
            }
            validated.into_lenient()
        };

        let chapter = Chapter::new(fm, parsed.rendered, path.clone());
        let state = chapter.frontmatter.state;
        if !lifecycle::admits(mode, state) {
            tracing::debug!(id = %chapter.id, %state, "not published in {mode} mode");
            rejected.push(Rejected {
                path: path.clone(),
                id: chapter.id,
                state,
            });
            continue;
        }

        tracing::debug!(id = %chapter.id, path = %path.display(), "admitted");
        model = model.fold_chapter(&chapter);
        admitted.push(path.clone());
    }

    for collision in &model.collisions {
        let diagnostic = Diagnostic::Collision(collision.clone());
        tracing::warn!("{diagnostic}");
        diagnostics.push(diagnostic);
    }
    for id in model.orphaned_sections() {
        let diagnostic = Diagnostic::OrphanedSection(id.clone());
        tracing::warn!("{diagnostic}");
        diagnostics.push(diagnostic);
    }

    tracing::info!(
        admitted = admitted.len(),
        rejected = rejected.len(),
        diagnostics = diagnostics.len(),
        "collected chapters"
    );
    Ok(Collection {
        model,
        admitted,
        rejected,
        diagnostics,
    })
}

// ============================================================================
// Emit
// ============================================================================

/// Progress of the emit phase, sent as pages finish.
#[derive(Debug, Clone)]
pub enum EmitEvent {
    PageWritten {
        /// 1-based position in `ViewModel::ids`.
        index: usize,
        id: ChapterId,
        title: String,
        path: PathBuf,
    },
    PageFailed {
        index: usize,
        id: ChapterId,
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct WrittenPage {
    pub id: ChapterId,
    pub path: PathBuf,
}

#[derive(Debug)]
pub struct FailedPage {
    pub id: ChapterId,
    pub error: WriteError,
}

/// Outcome of the emit phase, in `ViewModel::ids` order.
#[derive(Debug, Default)]
pub struct EmitReport {
    pub written: Vec<WrittenPage>,
    pub failed: Vec<FailedPage>,
}

impl EmitReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Render and write one page per chapter on a pool of `threads` workers.
pub fn emit<R, W>(
    model: &ViewModel,
    renderer: &R,
    writer: &W,
    output_dir: &Path,
    threads: usize,
    progress: Option<Sender<EmitEvent>>,
) -> Result<EmitReport, BuildError>
where
    R: PageRenderer,
    W: SiteWriter,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .build()?;
    tracing::info!(pages = model.ids.len(), threads, "writing pages");

    let results: Vec<(ChapterId, Result<PathBuf, WriteError>)> = pool.install(|| {
        model
            .ids
            .par_iter()
            .enumerate()
            .filter_map(|(i, id)| {
                let chapter = model.chapter(id)?;
                let result = emit_page(model, chapter, renderer, writer, output_dir);
                if let Some(tx) = &progress {
                    let event = match &result {
                        Ok(path) => EmitEvent::PageWritten {
                            index: i + 1,
                            id: id.clone(),
                            title: chapter.title.clone(),
                            path: path.clone(),
                        },
                        Err(error) => EmitEvent::PageFailed {
                            index: i + 1,
                            id: id.clone(),
                            error: error.to_string(),
                        },
                    };
                    // Receiver may already be gone.
                    tx.send(event).ok();
                }
                Some((id.clone(), result))
            })
            .collect()
    });

    let mut report = EmitReport::default();
    for (id, result) in results {
        match result {
            Ok(path) => report.written.push(WrittenPage { id, path }),
            Err(error) => {
                tracing::warn!(%id, "page not written: {error}");
                report.failed.push(FailedPage { id, error });
            }
        }
    }
    Ok(report)
}

fn emit_page<R: PageRenderer, W: SiteWriter>(
    model: &ViewModel,
    chapter: &ViewChapter,
    renderer: &R,
    writer: &W,
    output_dir: &Path,
) -> Result<PathBuf, WriteError> {
    let path = writer::page_path(output_dir, chapter)?;
    let html = renderer.render(model, chapter);
    if let Some(dir) = path.parent() {
        writer.ensure_dir(dir)?;
    }
    writer.write(&path, &html)?;
    tracing::debug!(id = %chapter.id, path = %path.display(), "wrote page");
    Ok(path)
}

// ============================================================================
// Build
// ============================================================================

/// Result of a full build.
#[derive(Debug)]
pub struct BuildReport {
    pub collection: Collection,
    pub emitted: EmitReport,
    pub stylesheet: PathBuf,
}

/// Collect, then write the stylesheet and every page to `output_dir`.
///
/// A stylesheet with the configured name in the source directory replaces the
/// bundled one.
pub fn build(
    source_root: &Path,
    output_dir: &Path,
    config: &SiteConfig,
    mode: BuildMode,
    progress: Option<Sender<EmitEvent>>,
) -> Result<BuildReport, BuildError> {
    let collection = collect(source_root, config, mode)?;

    let writer = FsWriter;
    writer.ensure_dir(output_dir)?;
    let stylesheet = output_dir.join(&config.stylesheet);
    let custom = source_root.join(&config.stylesheet);
    let css = if custom.is_file() {
        source::read(&custom)?.content
    } else {
        DEFAULT_STYLESHEET.to_string()
    };
    writer.write(&stylesheet, &css)?;

    let renderer = SiteRenderer::new(config, mode);
    let threads = config::effective_threads(&config.processing);
    let emitted = emit(
        &collection.model,
        &renderer,
        &writer,
        output_dir,
        threads,
        progress,
    )?;

    tracing::info!(
        written = emitted.written.len(),
        failed = emitted.failed.len(),
        output = %output_dir.display(),
        "build finished"
    );
    Ok(BuildReport {
        collection,
        emitted,
        stylesheet,
    })
}
