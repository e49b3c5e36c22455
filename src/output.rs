//! CLI output formatting for the collect and emit phases.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Every chapter leads
//! with its position in the navigation and its title; the source document is
//! shown as an indented `Source:` line so the inventory can be traced back to
//! files.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Chapters
//! 001 Introduction
//!     Source: 01-intro.md
//!     001 Pure functions
//!         Source: 01-intro/pure-functions.md
//! 002 (types)
//!     001 Codecs
//!         Source: 02-types/codecs.md
//!
//! Not published
//!     typescodecs (outline)
//!         Source: 02-types/codecs.md
//!
//! Diagnostics
//!     Section types has chapters but no document of its own
//! ```
//!
//! A section shown in parentheses has no document of its own.
//!
//! ## Build
//!
//! ```text
//! 001 Introduction → intro.html
//! 002 Pure functions → intro/pure-functions.html
//! 003 types: Cannot write docs/types.html: disk full
//!
//! Wrote 2 pages, 1 failed
//! ```
//!
//! # Architecture
//!
//! Each phase has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure, with no I/O.

use crate::identity::ChapterId;
use crate::pipeline::{Collection, Diagnostic, EmitEvent, EmitReport};
use crate::view_model::ViewModel;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Path relative to the source root when possible, for `Source:` lines.
fn display_source(path: &Path, source_root: &Path) -> String {
    path.strip_prefix(source_root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Chapter header: index + title, or the id in parentheses when the section
/// has no document.
///
/// ```text
/// 001 Introduction
/// 002 (types)
/// ```
fn chapter_line(index: usize, model: &ViewModel, id: &ChapterId) -> String {
    match model.chapter(id) {
        Some(chapter) => format!("{} {}", format_index(index), chapter.title),
        None => format!("{} ({})", format_index(index), id),
    }
}

// ============================================================================
// Collect output
// ============================================================================

/// Format the navigation inventory, unpublished documents and diagnostics.
pub fn format_collect_output(collection: &Collection, source_root: &Path) -> Vec<String> {
    let model = &collection.model;
    let mut lines = vec!["Chapters".to_string()];

    if model.nav.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (i, section) in model.nav.iter().enumerate() {
        lines.push(chapter_line(i + 1, model, &section.id));
        if let Some(chapter) = model.chapter(&section.id) {
            lines.push(format!(
                "{}Source: {}",
                indent(1),
                display_source(&chapter.source, source_root)
            ));
        }
        for (j, child) in section.children.iter().enumerate() {
            lines.push(format!("{}{}", indent(1), chapter_line(j + 1, model, &child.id)));
            if let Some(chapter) = model.chapter(&child.id) {
                lines.push(format!(
                    "{}Source: {}",
                    indent(2),
                    display_source(&chapter.source, source_root)
                ));
            }
        }
    }

    if !collection.rejected.is_empty() {
        lines.push(String::new());
        lines.push("Not published".to_string());
        for rejected in &collection.rejected {
            lines.push(format!("{}{} ({})", indent(1), rejected.id, rejected.state));
            lines.push(format!(
                "{}Source: {}",
                indent(2),
                display_source(&rejected.path, source_root)
            ));
        }
    }

    lines.extend(format_diagnostics(&collection.diagnostics));
    lines
}

/// Format diagnostics under a `Diagnostics` heading. Empty when there are none.
pub fn format_diagnostics(diagnostics: &[Diagnostic]) -> Vec<String> {
    if diagnostics.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![String::new(), "Diagnostics".to_string()];
    for diagnostic in diagnostics {
        for line in diagnostic.to_string().lines() {
            lines.push(format!("{}{}", indent(1), line));
        }
    }
    lines
}

/// Print collect output to stdout.
pub fn print_collect_output(collection: &Collection, source_root: &Path) {
    for line in format_collect_output(collection, source_root) {
        println!("{}", line);
    }
}

/// Closing line of `check`: a clean verdict only when nothing was reported.
pub fn format_check_summary(collection: &Collection) -> String {
    match collection.diagnostics.len() {
        0 => "==> Chapters are valid".to_string(),
        1 => "==> Found 1 problem".to_string(),
        n => format!("==> Found {} problems", n),
    }
}

// ============================================================================
// Emit output
// ============================================================================

/// Format a single emit progress event.
pub fn format_emit_event(event: &EmitEvent, output_dir: &Path) -> Vec<String> {
    match event {
        EmitEvent::PageWritten {
            index, title, path, ..
        } => vec![format!(
            "{} {} \u{2192} {}",
            format_index(*index),
            title,
            display_source(path, output_dir)
        )],
        EmitEvent::PageFailed { index, id, error } => {
            vec![format!("{} {}: {}", format_index(*index), id, error)]
        }
    }
}

/// Format the emit summary line, plus one line per failed page.
pub fn format_emit_output(report: &EmitReport, output_dir: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    let written = report.written.len();
    let noun = if written == 1 { "page" } else { "pages" };
    if report.failed.is_empty() {
        lines.push(format!(
            "Wrote {} {} \u{2192} {}",
            written,
            noun,
            output_dir.display()
        ));
    } else {
        lines.push(format!(
            "Wrote {} {}, {} failed",
            written,
            noun,
            report.failed.len()
        ));
        for failed in &report.failed {
            lines.push(format!("{}{}: {}", indent(1), failed.id, failed.error));
        }
    }
    lines
}

/// Print emit summary to stdout.
pub fn print_emit_output(report: &EmitReport, output_dir: &Path) {
    for line in format_emit_output(report, output_dir) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
