//! Navigation tree and chapter table aggregation.
//!
//! Admitted chapters are folded, one at a time and in discovery order, into a
//! [`ViewModel`]: a two-level navigation tree plus a table of rendered
//! chapters keyed by [`ChapterId`].
//!
//! ```text
//! nav                                   by_id
//! ├── intro (order 1)                   intro  → Introduction, intro.html
//! │   ├── introb (order 1)              introb → Part B, intro/b.html
//! │   └── introa (order 2)              introa → Part A, intro/a.html
//! └── types (order 2)                   types  → Types, types.html
//! ```
//!
//! ## Fold rules
//!
//! Each step runs two independent reductions:
//!
//! - **Chapter table**: `by_id[id]` is overwritten. When an entry already
//!   exists the overwrite is recorded as a [`Collision`]; the last chapter
//!   processed wins.
//! - **Navigation**: a chapter without a parent upserts a section (an existing
//!   section keeps its children and only takes the new order). A chapter with a
//!   parent is upserted into that section's children; if the section does not
//!   exist yet a placeholder is created with the *child's* order.
//!
//! Sections and children are kept sorted by order with a stable sort, so
//! equal orders keep their arrival order.
//!
//! The placeholder keeps the child's order until the section's own document
//! arrives. When a child is processed before its parent and the parent never
//! shows up (filtered out, or missing), the section stays ordered by its first
//! child and has no chapter of its own; [`ViewModel::orphaned_sections`]
//! lists those.
//!
//! ## Persistence
//!
//! [`ViewModel::with_chapter`] does not mutate: it returns a new model.
//! Sections and chapters live behind `Arc`, so a step copies only the section
//! it touches and shares everything else with the previous model. The final
//! model is an immutable snapshot that can be handed to parallel renderers.
//!
//! Keeping the previous model still costs a shallow copy of the section list
//! and the chapter table, linear in the number of chapters. Folding a whole
//! sequence that way would be quadratic, so [`ViewModel::from_chapters`] and
//! the pipeline fold with [`ViewModel::fold_chapter`], which takes the model by
//! value and updates it in place. Both produce the same model.

use crate::frontmatter::Frontmatter;
use crate::identity::ChapterId;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// An admitted document, ready to be folded.
#[derive(Debug, Clone, PartialEq)]
pub struct Chapter {
    pub id: ChapterId,
    pub frontmatter: Frontmatter,
    /// Rendered HTML body.
    pub contents: String,
    pub source: PathBuf,
}

impl Chapter {
    pub fn new(frontmatter: Frontmatter, contents: String, source: PathBuf) -> Self {
        Self {
            id: ChapterId::resolve(&frontmatter.slug, frontmatter.parent.as_deref()),
            frontmatter,
            contents,
            source,
        }
    }
}

/// A chapter as the renderer sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewChapter {
    pub id: ChapterId,
    pub slug: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Link target relative to the site root.
    pub href: String,
    pub contents: String,
    pub source: PathBuf,
}

impl ViewChapter {
    fn from_chapter(chapter: &Chapter) -> Self {
        let fm = &chapter.frontmatter;
        Self {
            id: chapter.id.clone(),
            slug: fm.slug.clone(),
            title: fm.title.clone(),
            parent: fm.parent.clone(),
            href: href(&fm.slug, fm.parent.as_deref()),
            contents: chapter.contents.clone(),
            source: chapter.source.clone(),
        }
    }
}

/// Site-relative link for a chapter.
pub fn href(slug: &str, parent: Option<&str>) -> String {
    match parent {
        Some(parent) => format!("{parent}/{slug}.html"),
        None => format!("{slug}.html"),
    }
}

/// Reference to a chapter nested under a section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChildNode {
    pub id: ChapterId,
    pub order: f64,
}

/// Top-level navigation entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParentNode {
    pub id: ChapterId,
    pub order: f64,
    pub children: Vec<ChildNode>,
}

impl ParentNode {
    fn new(id: ChapterId, order: f64) -> Self {
        Self {
            id,
            order,
            children: Vec::new(),
        }
    }

    /// Copy of this section with `child` upserted and children re-sorted.
    fn with_child(&self, child: ChildNode) -> Self {
        let mut children = self.children.clone();
        match children.iter_mut().find(|c| c.id == child.id) {
            Some(existing) => existing.order = child.order,
            None => children.push(child),
        }
        children.sort_by(|a, b| a.order.total_cmp(&b.order));
        Self {
            id: self.id.clone(),
            order: self.order,
            children,
        }
    }
}

/// Two chapters resolved to the same id; `winner` replaced `shadowed`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Collision {
    pub id: ChapterId,
    pub shadowed: PathBuf,
    pub winner: PathBuf,
}

/// Navigation tree plus chapter table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewModel {
    /// Sections ordered by `order`, each with ordered children.
    pub nav: Vec<Arc<ParentNode>>,
    pub by_id: BTreeMap<ChapterId, Arc<ViewChapter>>,
    /// Chapter ids in first-arrival order, without duplicates.
    pub ids: Vec<ChapterId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub collisions: Vec<Collision>,
}

impl ViewModel {
    /// Fold a sequence of chapters, in order, into a model.
    pub fn from_chapters<'a>(chapters: impl IntoIterator<Item = &'a Chapter>) -> Self {
        chapters
            .into_iter()
            .fold(Self::default(), |model, chapter| model.fold_chapter(chapter))
    }

    /// The model after processing one more chapter. `self` is left untouched.
    pub fn with_chapter(&self, chapter: &Chapter) -> Self {
        self.clone().fold_chapter(chapter)
    }

    /// Consuming form of [`with_chapter`](Self::with_chapter).
    pub fn fold_chapter(mut self, chapter: &Chapter) -> Self {
        let view = Arc::new(ViewChapter::from_chapter(chapter));
        match self.by_id.insert(chapter.id.clone(), view) {
            Some(previous) => {
                tracing::debug!(id = %chapter.id, "chapter id overwritten");
                self.collisions.push(Collision {
                    id: chapter.id.clone(),
                    shadowed: previous.source.clone(),
                    winner: chapter.source.clone(),
                });
            }
            None => self.ids.push(chapter.id.clone()),
        }
        reduce_nav(&mut self.nav, chapter);
        self
    }

    pub fn chapter(&self, id: &ChapterId) -> Option<&ViewChapter> {
        self.by_id.get(id).map(Arc::as_ref)
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Sections with no chapter of their own (placeholders never filled in).
    pub fn orphaned_sections(&self) -> Vec<&ChapterId> {
        self.nav
            .iter()
            .filter(|node| !self.by_id.contains_key(&node.id))
            .map(|node| &node.id)
            .collect()
    }
}

fn sort_sections(nav: &mut [Arc<ParentNode>]) {
    nav.sort_by(|a, b| a.order.total_cmp(&b.order));
}

fn reduce_nav(nav: &mut Vec<Arc<ParentNode>>, chapter: &Chapter) {
    let order = chapter.frontmatter.order;

    match chapter.frontmatter.parent.as_deref() {
        None => {
            match nav.iter().position(|node| node.id == chapter.id) {
                Some(index) => {
                    let updated = ParentNode {
                        order,
                        ..ParentNode::clone(&nav[index])
                    };
                    nav[index] = Arc::new(updated);
                }
                None => nav.push(Arc::new(ParentNode::new(chapter.id.clone(), order))),
            }
            sort_sections(nav);
        }
        Some(parent) => {
            let parent_id = ChapterId::of_parent(parent);
            let index = match nav.iter().position(|node| node.id == parent_id) {
                Some(index) => index,
                None => {
                    tracing::debug!(section = %parent_id, child = %chapter.id, "placeholder section");
                    nav.push(Arc::new(ParentNode::new(parent_id.clone(), order)));
                    sort_sections(nav);
                    nav.iter()
                        .position(|node| node.id == parent_id)
                        .unwrap_or(nav.len() - 1)
                }
            };
            let child = ChildNode {
                id: chapter.id.clone(),
                order,
            };
            nav[index] = Arc::new(nav[index].with_child(child));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_input_gives_empty_model() {
        let none: [Chapter; 0] = [];
        let model = ViewModel::from_chapters(&none);
        assert!(model.is_empty());
        assert!(model.nav.is_empty());
        assert!(model.ids.is_empty());
    }

    #[test]
    fn children_sorted_under_parent() {
        let chapters = [
            chapter("intro", None, 1.0),
            chapter("a", Some("intro"), 2.0),
            chapter("b", Some("intro"), 1.0),
        ];
        let model = ViewModel::from_chapters(&chapters);

        assert_eq!(
            model.nav,
            vec![Arc::new(ParentNode {
                id: "intro".into(),
                order: 1.0,
                children: vec![
                    ChildNode {
                        id: "introb".into(),
                        order: 1.0
                    },
                    ChildNode {
                        id: "introa".into(),
                        order: 2.0
                    },
                ],
            })]
        );
        assert_eq!(find_chapter(&model, "introb").href, "intro/b.html");
    }

    #[test]
    fn top_level_href_has_no_directory() {
        let model = ViewModel::from_chapters(&[chapter("intro", None, 1.0)]);
        assert_eq!(find_chapter(&model, "intro").href, "intro.html");
    }

    #[test]
    fn sections_sorted_by_order() {
        let chapters = [
            chapter("c", None, 3.0),
            chapter("a", None, 1.0),
            chapter("b", None, 2.0),
        ];
        let model = ViewModel::from_chapters(&chapters);
        assert_eq!(nav_ids(&model), vec!["a", "b", "c"]);
    }

    #[test]
    fn equal_orders_keep_arrival_order() {
        let chapters = [
            chapter("first", None, 1.0),
            chapter("second", None, 1.0),
            chapter("third", None, 1.0),
            chapter("y", Some("first"), 5.0),
            chapter("x", Some("first"), 5.0),
        ];
        let model = ViewModel::from_chapters(&chapters);
        assert_eq!(nav_ids(&model), vec!["first", "second", "third"]);
        assert_eq!(child_ids(&model, "first"), vec!["firsty", "firstx"]);
    }

    #[test]
    fn child_before_parent_synthesizes_placeholder_with_child_order() {
        let model = ViewModel::from_chapters(&[chapter("a", Some("intro"), 7.0)]);

        let section = find_section(&model, "intro");
        assert_eq!(section.order, 7.0);
        assert_eq!(child_ids(&model, "intro"), vec!["introa"]);
        assert_eq!(model.orphaned_sections(), vec![&ChapterId::from("intro")]);
    }

    #[test]
    fn parent_arrival_corrects_placeholder_order_and_keeps_children() {
        let chapters = [
            chapter("a", Some("intro"), 7.0),
            chapter("types", None, 2.0),
            chapter("intro", None, 1.0),
        ];
        let model = ViewModel::from_chapters(&chapters);

        assert_eq!(find_section(&model, "intro").order, 1.0);
        assert_nav_shape(&model, &[("intro", &["introa"]), ("types", &[])]);
        assert!(model.orphaned_sections().is_empty());
    }

    #[test]
    fn placeholder_order_depends_on_processing_order() {
        // Parent first: section carries its own order.
        let parent_first = ViewModel::from_chapters(&[
            chapter("intro", None, 5.0),
            chapter("a", Some("intro"), 1.0),
            chapter("types", None, 3.0),
        ]);
        // Child first, parent never processed: section carries the child's order.
        let child_first = ViewModel::from_chapters(&[
            chapter("a", Some("intro"), 1.0),
            chapter("types", None, 3.0),
        ]);
        assert_eq!(nav_ids(&parent_first), vec!["types", "intro"]);
        assert_eq!(nav_ids(&child_first), vec!["intro", "types"]);
    }

    #[test]
    fn placeholder_is_sorted_into_place() {
        let chapters = [
            chapter("z", None, 10.0),
            chapter("a", Some("intro"), 1.0),
        ];
        let model = ViewModel::from_chapters(&chapters);
        assert_eq!(nav_ids(&model), vec!["intro", "z"]);
    }

    #[test]
    fn reprocessed_section_updates_order_only() {
        let chapters = [
            chapter("intro", None, 1.0),
            chapter("a", Some("intro"), 1.0),
            chapter("types", None, 2.0),
            chapter("intro", None, 3.0),
        ];
        let model = ViewModel::from_chapters(&chapters);
        assert_nav_shape(&model, &[("types", &[]), ("intro", &["introa"])]);
        assert_eq!(find_section(&model, "intro").order, 3.0);
    }

    #[test]
    fn collision_last_writer_wins_and_is_recorded() {
        let mut first = chapter("intro", None, 1.0);
        first.frontmatter.title = "First".to_string();
        first.source = PathBuf::from("one.md");
        let mut second = chapter("intro", None, 1.0);
        second.frontmatter.title = "Second".to_string();
        second.source = PathBuf::from("two.md");

        let model = ViewModel::from_chapters(&[first, second]);

        assert_eq!(model.by_id.len(), 1);
        assert_eq!(find_chapter(&model, "intro").title, "Second");
        assert_eq!(
            model.collisions,
            vec![Collision {
                id: "intro".into(),
                shadowed: PathBuf::from("one.md"),
                winner: PathBuf::from("two.md"),
            }]
        );
    }

    #[test]
    fn ids_are_deduplicated_in_arrival_order() {
        let chapters = [
            chapter("b", None, 2.0),
            chapter("a", None, 1.0),
            chapter("b", None, 2.0),
        ];
        let model = ViewModel::from_chapters(&chapters);
        let ids: Vec<&str> = model.ids.iter().map(ChapterId::as_str).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn duplicate_child_is_upserted_not_repeated() {
        let chapters = [
            chapter("intro", None, 1.0),
            chapter("a", Some("intro"), 1.0),
            chapter("b", Some("intro"), 2.0),
            chapter("a", Some("intro"), 3.0),
        ];
        let model = ViewModel::from_chapters(&chapters);
        assert_eq!(child_ids(&model, "intro"), vec!["introb", "introa"]);
    }

    #[test]
    fn cross_level_id_collision_is_recorded() {
        // "introb" as a section slug and as intro's child "b".
        let chapters = [
            chapter("intro", None, 1.0),
            chapter("b", Some("intro"), 1.0),
            chapter("introb", None, 2.0),
        ];
        let model = ViewModel::from_chapters(&chapters);
        assert_eq!(model.collisions.len(), 1);
        assert_eq!(find_chapter(&model, "introb").href, "introb.html");
    }

    #[test]
    fn every_distinct_chapter_is_indexed_and_in_nav() {
        let chapters = [
            chapter("b", Some("types"), 2.0),
            chapter("intro", None, 1.0),
            chapter("a", Some("intro"), 1.0),
            chapter("types", None, 2.0),
            chapter("a", Some("types"), 1.0),
        ];
        let model = ViewModel::from_chapters(&chapters);

        assert_eq!(model.by_id.len(), chapters.len());
        let in_nav = all_nav_ids(&model);
        for c in &chapters {
            assert!(model.by_id.contains_key(&c.id));
            assert!(in_nav.contains(&c.id.as_str()), "{} missing from nav", c.id);
        }
    }

    #[test]
    fn nav_is_ordered_at_every_level() {
        let chapters = [
            chapter("c", Some("s2"), 3.0),
            chapter("s2", None, 2.0),
            chapter("a", Some("s2"), 1.0),
            chapter("s1", None, 1.0),
            chapter("b", Some("s2"), 2.0),
            chapter("z", Some("s1"), 9.0),
            chapter("y", Some("s1"), -1.0),
        ];
        // Check the invariant after every step, not just at the end.
        let mut model = ViewModel::default();
        for c in &chapters {
            model = model.with_chapter(c);
            assert_nav_sorted(&model);
        }
    }

    #[test]
    fn folding_twice_is_identical() {
        let chapters = [
            chapter("a", Some("intro"), 2.0),
            chapter("intro", None, 1.0),
            chapter("b", Some("intro"), 1.0),
            chapter("intro", None, 4.0),
        ];
        assert_eq!(
            ViewModel::from_chapters(&chapters),
            ViewModel::from_chapters(&chapters)
        );
    }

    #[test]
    fn with_chapter_leaves_previous_model_untouched() {
        let before = ViewModel::from_chapters(&[
            chapter("intro", None, 1.0),
            chapter("types", None, 2.0),
        ]);
        let snapshot = before.clone();
        let after = before.with_chapter(&chapter("a", Some("intro"), 1.0));

        assert_eq!(before, snapshot);
        assert!(child_ids(&before, "intro").is_empty());
        assert_eq!(child_ids(&after, "intro"), vec!["introa"]);
        // Untouched sections are shared, not copied.
        assert!(Arc::ptr_eq(
            &before.nav[1],
            after.nav.iter().find(|n| n.id.as_str() == "types").unwrap()
        ));
    }

    #[test]
    fn persistent_and_consuming_folds_agree() {
        let chapters = [
            chapter("a", Some("intro"), 2.0),
            chapter("intro", None, 1.0),
            chapter("types", None, 2.0),
            chapter("b", Some("intro"), 1.0),
            chapter("types", None, 3.0),
        ];
        let persistent = chapters
            .iter()
            .fold(ViewModel::default(), |model, c| model.with_chapter(c));
        let consumed = ViewModel::from_chapters(&chapters);

        assert_eq!(persistent, consumed);
        assert_eq!(consumed.collisions.len(), 1);
    }

    #[test]
    fn fold_chapter_keeps_untouched_chapters_shared() {
        let before = ViewModel::from_chapters(&[chapter("intro", None, 1.0)]);
        let intro = Arc::clone(&before.by_id[&ChapterId::from("intro")]);
        let after = before.fold_chapter(&chapter("types", None, 2.0));
        assert!(Arc::ptr_eq(&intro, &after.by_id[&ChapterId::from("intro")]));
    }

    #[test]
    fn serializes_to_json() {
        let model = ViewModel::from_chapters(&[chapter("intro", None, 1.0)]);
        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["nav"][0]["id"], "intro");
        assert_eq!(json["by_id"]["intro"]["href"], "intro.html");
        assert!(json.get("collisions").is_none());
    }
}
