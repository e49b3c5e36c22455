//! # Chapterhouse
//!
//! A static site generator for long-form guides written as a tree of markdown
//! chapters. Each document declares where it sits in the guide through YAML
//! front-matter; the generator folds those declarations into a two-level
//! navigation and writes one HTML page per chapter.
//!
//! ```markdown
//! ---
//! title: Pure functions
//! slug: pure-functions
//! order: 1
//! state: release
//! parent: intro
//! ---
//! ```
//!
//! # Architecture: Collect, Then Emit
//!
//! ```text
//! 1. Collect   chapters/  →  ViewModel     (sequential fold, discovery order)
//! 2. Emit      ViewModel  →  docs/         (one page per chapter, in parallel)
//! ```
//!
//! The collect phase is a left fold: every admitted document produces a new
//! [`view_model::ViewModel`] from the previous one. The emit phase only reads
//! the finished model, so pages are rendered and written on a bounded thread
//! pool without any locking.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`source`] | Walks the source directory, matches the glob pattern, reads documents |
//! | [`parse`] | Markdown to HTML with pulldown-cmark; extracts the YAML front-matter |
//! | [`frontmatter`] | Decodes untyped front-matter into [`frontmatter::Frontmatter`], reporting each violation |
//! | [`identity`] | [`identity::ChapterId`]: the join key between navigation and chapter table |
//! | [`lifecycle`] | `draft` / `outline` / `release` states and which build mode publishes them |
//! | [`view_model`] | Persistent fold into the navigation tree and chapter table |
//! | [`render`] | `PageRenderer` trait and the default maud page template |
//! | [`writer`] | `SiteWriter` trait, filesystem writer and output layout |
//! | [`pipeline`] | Collect and emit phases, diagnostics and reports |
//! | [`config`] | `config.toml` loading, validation and merging over stock defaults |
//! | [`output`] | CLI output formatting of inventories and build progress |
//!
//! # Design Decisions
//!
//! ## Front-Matter Is Data, Not Trust
//!
//! Front-matter is parsed untyped and validated field by field. A broken
//! document does not stop the build: it is reported with every offending field
//! and rendered with default values (`order = 99`, `state = outline`), which
//! keeps it out of production builds. `strict = true` turns the first broken
//! document into an error instead.
//!
//! ## Explicit Collisions
//!
//! A chapter's id is its parent's slug followed by its own slug. Two documents
//! resolving to the same id do not both survive: the one processed last wins.
//! Every such overwrite is recorded and reported rather than lost silently.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), a compile-time
//! HTML macro system. Malformed templates are build errors and every
//! interpolated value is escaped. There is no template directory to ship.

pub mod config;
pub mod frontmatter;
pub mod identity;
pub mod lifecycle;
pub mod output;
pub mod parse;
pub mod pipeline;
pub mod render;
pub mod source;
pub mod view_model;
pub mod writer;

#[cfg(test)]
pub(crate) mod test_helpers;
