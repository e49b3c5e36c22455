//! Chapter identity.
//!
//! A chapter is identified by its parent slug concatenated with its own slug.
//! The same rule resolves a bare parent reference, so a section document
//! (`slug: intro`) and the parent named by its children (`parent: intro`)
//! land on the same id:
//!
//! ```text
//! slug: intro                 → "intro"
//! slug: b, parent: intro      → "introb"
//! parent: intro (reference)   → "intro"
//! ```
//!
//! The concatenation has no separator, so `(parent: "ab", slug: "c")` and
//! `(parent: "a", slug: "bc")` collide. Collisions are detected by the view
//! model, not prevented here.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Join key between the navigation tree and the chapter table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChapterId(String);

impl ChapterId {
    /// Derive the id for a document with the given slug and optional parent.
    pub fn resolve(slug: &str, parent: Option<&str>) -> Self {
        match parent {
            Some(parent) => Self(format!("{parent}{slug}")),
            None => Self(slug.to_string()),
        }
    }

    /// Id of the section a child document points at with `parent:`.
    pub fn of_parent(parent: &str) -> Self {
        Self::resolve(parent, None)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ChapterId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ChapterId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_level_id_is_slug() {
        assert_eq!(ChapterId::resolve("intro", None).as_str(), "intro");
    }

    #[test]
    fn child_id_prefixes_parent() {
        assert_eq!(ChapterId::resolve("b", Some("intro")).as_str(), "introb");
    }

    #[test]
    fn parent_reference_matches_section_id() {
        assert_eq!(
            ChapterId::of_parent("intro"),
            ChapterId::resolve("intro", None)
        );
    }

    #[test]
    fn empty_slug_yields_empty_id() {
        assert_eq!(ChapterId::resolve("", None).as_str(), "");
    }

    #[test]
    fn concatenation_without_separator_can_collide() {
        assert_eq!(
            ChapterId::resolve("c", Some("ab")),
            ChapterId::resolve("bc", Some("a"))
        );
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&ChapterId::from("introb")).unwrap();
        assert_eq!(json, r#""introb""#);
    }

    #[test]
    fn map_lookup_by_str() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(ChapterId::from("intro"), 1);
        assert_eq!(map.get("intro"), Some(&1));
    }
}
