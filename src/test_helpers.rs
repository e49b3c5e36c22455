//! Shared test utilities for the chapterhouse test suite.
//!
//! Provides chapter builders, view model lookups, and navigation tree
//! assertions.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let model = ViewModel::from_chapters(&[
//!     chapter("intro", None, 1.0),
//!     chapter("a", Some("intro"), 2.0),
//!     chapter("b", Some("intro"), 1.0),
//! ]);
//!
//! assert_nav_shape(&model, &[("intro", &["introb", "introa"])]);
//! assert_eq!(find_chapter(&model, "introb").href, "intro/b.html");
//! ```

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::frontmatter::Frontmatter;
use crate::lifecycle::LifecycleState;
use crate::view_model::{Chapter, ParentNode, ViewChapter, ViewModel};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/chapters/` to a temp directory and return it.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/chapters");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Write a markdown document with front-matter under `root`.
pub fn write_doc(root: &Path, rel: &str, frontmatter: &str, body: &str) -> PathBuf {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, format!("---\n{frontmatter}\n---\n\n{body}\n")).unwrap();
    path
}

// =========================================================================
// Builders
// =========================================================================

/// A released chapter titled after its slug.
pub fn chapter(slug: &str, parent: Option<&str>, order: f64) -> Chapter {
    chapter_in_state(slug, parent, order, LifecycleState::Release)
}

pub fn chapter_in_state(
    slug: &str,
    parent: Option<&str>,
    order: f64,
    state: LifecycleState,
) -> Chapter {
    let frontmatter = Frontmatter {
        title: slug.to_uppercase(),
        slug: slug.to_string(),
        order,
        state,
        parent: parent.map(str::to_string),
    };
    let source = match parent {
        Some(p) => PathBuf::from(format!("{p}/{slug}.md")),
        None => PathBuf::from(format!("{slug}.md")),
    };
    Chapter::new(frontmatter, format!("<p>{slug}</p>\n"), source)
}

// =========================================================================
// View model lookups (panic with a clear message on miss)
// =========================================================================

/// Find a chapter by id. Panics if not found.
pub fn find_chapter<'a>(model: &'a ViewModel, id: &str) -> &'a ViewChapter {
    model.by_id.get(id).map(|c| &**c).unwrap_or_else(|| {
        let ids: Vec<&str> = model.by_id.keys().map(|k| k.as_str()).collect();
        panic!("chapter '{id}' not found. Available: {ids:?}")
    })
}

/// Find a top-level section by id. Panics if not found.
pub fn find_section<'a>(model: &'a ViewModel, id: &str) -> &'a ParentNode {
    model
        .nav
        .iter()
        .find(|n| n.id.as_str() == id)
        .map(|n| &**n)
        .unwrap_or_else(|| {
            let ids = nav_ids(model);
            panic!("section '{id}' not found. Available: {ids:?}")
        })
}

// =========================================================================
// Navigation helpers
// =========================================================================

/// Top-level section ids in nav order.
pub fn nav_ids(model: &ViewModel) -> Vec<&str> {
    model.nav.iter().map(|n| n.id.as_str()).collect()
}

/// Child ids under a section, in order. Panics if the section is missing.
pub fn child_ids<'a>(model: &'a ViewModel, section: &str) -> Vec<&'a str> {
    find_section(model, section)
        .children
        .iter()
        .map(|c| c.id.as_str())
        .collect()
}

/// Every id referenced anywhere in the nav tree.
pub fn all_nav_ids(model: &ViewModel) -> Vec<&str> {
    model
        .nav
        .iter()
        .flat_map(|n| std::iter::once(n.id.as_str()).chain(n.children.iter().map(|c| c.id.as_str())))
        .collect()
}

/// Assert that the navigation tree matches an expected shape.
///
/// Each entry is `(section id, child ids)`. Use `&[]` for sections without
/// children.
pub fn assert_nav_shape(model: &ViewModel, expected: &[(&str, &[&str])]) {
    let expected_ids: Vec<&str> = expected.iter().map(|(id, _)| *id).collect();
    assert_eq!(nav_ids(model), expected_ids, "nav sections mismatch");

    for (id, children) in expected {
        assert_eq!(
            child_ids(model, id),
            children.to_vec(),
            "children of '{id}' mismatch"
        );
    }
}

/// Assert sections and every children list are non-decreasing in order.
pub fn assert_nav_sorted(model: &ViewModel) {
    for pair in model.nav.windows(2) {
        assert!(
            pair[0].order <= pair[1].order,
            "sections out of order: {} ({}) before {} ({})",
            pair[0].id,
            pair[0].order,
            pair[1].id,
            pair[1].order
        );
    }
    for section in &model.nav {
        for pair in section.children.windows(2) {
            assert!(
                pair[0].order <= pair[1].order,
                "children of {} out of order: {} before {}",
                section.id,
                pair[0].id,
                pair[1].id
            );
        }
    }
}
