//! HTML page rendering.
//!
//! Every chapter becomes one standalone page carrying the full navigation:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ h1.page-title          (site title)          │
//! ├──────────────┬───────────────────────────────┤
//! │ nav.nav      │ main.main                     │
//! │  Jump To ... │  h2.chapter-title             │
//! │  1. Intro    │                               │
//! │    1. Pure   │  rendered markdown            │
//! │  2. Types    │                               │
//! └──────────────┴───────────────────────────────┘
//! ```
//!
//! Links in the navigation are site-relative (`intro/pure.html`) and resolve
//! against the page's `<base href>`. Production builds use the configured
//! `base_href`; preview builds point the base at the output root with a
//! relative path so the site can be opened straight from disk.
//!
//! Uses [maud](https://maud.lambda.xyz/) so everything interpolated is escaped,
//! apart from the chapter body, which is already HTML.

use crate::config::SiteConfig;
use crate::lifecycle::BuildMode;
use crate::view_model::{ParentNode, ViewChapter, ViewModel};
use maud::{DOCTYPE, Markup, PreEscaped, html};

/// Turns one chapter of a finished model into a page.
///
/// Implementations are shared across emit workers.
pub trait PageRenderer: Sync {
    fn render(&self, model: &ViewModel, chapter: &ViewChapter) -> String;
}

/// The default page template.
#[derive(Debug, Clone)]
pub struct SiteRenderer {
    title: String,
    nav_heading: String,
    stylesheet: String,
    base_href: Option<String>,
}

impl SiteRenderer {
    pub fn new(config: &SiteConfig, mode: BuildMode) -> Self {
        Self {
            title: config.title.clone(),
            nav_heading: config.nav_heading.clone(),
            stylesheet: config.stylesheet.clone(),
            base_href: match mode {
                BuildMode::Production => Some(config.base_href.clone()),
                BuildMode::Preview => None,
            },
        }
    }

    fn base_for(&self, chapter: &ViewChapter) -> String {
        match &self.base_href {
            Some(base) => base.clone(),
            None => relative_root(&chapter.href),
        }
    }
}

impl PageRenderer for SiteRenderer {
    fn render(&self, model: &ViewModel, chapter: &ViewChapter) -> String {
        let content = html! {
            h1.page-title { (self.title) }
            div.layout {
                (render_nav(model, chapter, &self.nav_heading))
                main.main {
                    h2.chapter-title { (chapter.title) }
                    (PreEscaped(&chapter.contents))
                }
            }
        };
        base_document(
            &self.title,
            &self.base_for(chapter),
            &self.stylesheet,
            content,
        )
        .into_string()
    }
}

/// Path from a page back to the output root, e.g. `../` for `intro/a.html`.
fn relative_root(href: &str) -> String {
    let depth = href.matches('/').count();
    if depth == 0 {
        "./".to_string()
    } else {
        "../".repeat(depth)
    }
}

// ============================================================================
// HTML Components
// ============================================================================

fn base_document(title: &str, base: &str, stylesheet: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                base href=(base);
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                meta http-equiv="X-UA-Compatible" content="ie=edge";
                title { (title) }
                link rel="stylesheet" href=(stylesheet);
            }
            body {
                (content)
            }
        }
    }
}

/// Renders the chapter navigation, marking `current`.
pub fn render_nav(model: &ViewModel, current: &ViewChapter, heading: &str) -> Markup {
    html! {
        nav.nav {
            h3.nav-title { (heading) }
            ol {
                @for section in &model.nav {
                    (render_section(model, section, current))
                }
            }
        }
    }
}

fn render_section(model: &ViewModel, section: &ParentNode, current: &ViewChapter) -> Markup {
    html! {
        li {
            // A placeholder section has no page to link to.
            @match model.chapter(&section.id) {
                Some(chapter) => {
                    (render_link(chapter, current))
                },
                None => {
                    span.nav-section { (section.id) }
                },
            }
            @if !section.children.is_empty() {
                ol {
                    @for child in &section.children {
                        @if let Some(chapter) = model.chapter(&child.id) {
                            li { (render_link(chapter, current)) }
                        }
                    }
                }
            }
        }
    }
}

fn render_link(chapter: &ViewChapter, current: &ViewChapter) -> Markup {
    let is_current = chapter.id == current.id;
    html! {
        a class=[is_current.then_some("current")] href=(chapter.href) { (chapter.title) }
    }
}
