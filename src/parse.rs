//! Markdown parsing.
//!
//! Turns a raw document into rendered HTML plus its untyped front-matter.
//! The front-matter is the YAML block at the very top of the file:
//!
//! ```markdown
//! ---
//! title: Pure functions
//! slug: pure-functions
//! order: 1
//! state: release
//! parent: intro
//! ---
//!
//! # Pure functions
//! ...
//! ```
//!
//! Typing the front-matter is not this module's job; see
//! [`crate::frontmatter`]. Malformed YAML is logged and handed on as
//! `null`, which the validator reports field by field.
//!
//! Rendering extras on top of CommonMark:
//!
//! - tables, footnotes, strikethrough and `{#id}` heading attributes
//! - GitHub-style `id` attributes on headings (`## Why bother?` → `id="why-bother"`)
//! - fenced `json5` blocks are treated as program output and folded into a
//!   `<details>` element

use crate::source::RawDocument;
use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd, html};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A document after markdown rendering, front-matter still untyped.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub path: PathBuf,
    pub rendered: String,
    pub frontmatter: Value,
}

fn markdown_options() -> Options {
    Options::ENABLE_YAML_STYLE_METADATA_BLOCKS
        | Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_HEADING_ATTRIBUTES
}

pub fn parse(raw: &RawDocument) -> ParsedDocument {
    let mut metadata: Option<String> = None;
    let mut blocks_seen = 0;
    let mut in_metadata = false;
    let mut events = Vec::new();

    for event in Parser::new_ext(&raw.content, markdown_options()) {
        match event {
            Event::Start(Tag::MetadataBlock(_)) => {
                in_metadata = true;
                blocks_seen += 1;
            }
            Event::End(TagEnd::MetadataBlock(_)) => in_metadata = false,
            Event::Text(text) if in_metadata => {
                // Only the leading block is front-matter.
                if blocks_seen == 1 {
                    metadata.get_or_insert_with(String::new).push_str(&text);
                }
            }
            event if !in_metadata => events.push(event),
            _ => {}
        }
    }

    let frontmatter = decode_yaml(metadata.as_deref(), &raw.path);
    let events = wrap_output_blocks(add_heading_ids(events));

    let mut rendered = String::with_capacity(raw.content.len() * 3 / 2);
    html::push_html(&mut rendered, events.into_iter());

    ParsedDocument {
        path: raw.path.clone(),
        rendered,
        frontmatter,
    }
}

fn decode_yaml(yaml: Option<&str>, path: &Path) -> Value {
    let Some(yaml) = yaml else {
        return Value::Null;
    };
    match serde_yaml::from_str::<Value>(yaml) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(chapter = %path.display(), "front-matter is not valid YAML: {e}");
            Value::Null
        }
    }
}

// ============================================================================
// Event rewriting
// ============================================================================

fn add_heading_ids(mut events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut slugger = Slugger::default();
    for i in 0..events.len() {
        if !matches!(events[i], Event::Start(Tag::Heading { id: None, .. })) {
            continue;
        }
        let slug = slugger.slug(&heading_text(&events[i + 1..]));
        if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
            *id = Some(CowStr::from(slug));
        }
    }
    events
}

fn heading_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            _ => {}
        }
    }
    text
}

fn wrap_output_blocks(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut out = Vec::with_capacity(events.len());
    let mut wrapping = false;
    for event in events {
        let opens = matches!(
            &event,
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info)))
                if info.split_whitespace().next() == Some("json5")
        );
        if opens {
            out.push(Event::Html(CowStr::Borrowed(
                "<details><summary>output</summary>\n",
            )));
            out.push(event);
            wrapping = true;
        } else if wrapping && matches!(event, Event::End(TagEnd::CodeBlock)) {
            out.push(event);
            out.push(Event::Html(CowStr::Borrowed("</details>\n")));
            wrapping = false;
        } else {
            out.push(event);
        }
    }
    out
}

/// GitHub-compatible heading slugs, unique within one document.
#[derive(Default)]
struct Slugger {
    seen: HashMap<String, usize>,
}

impl Slugger {
    fn slug(&mut self, text: &str) -> String {
        let base = slugify(text);
        let mut slug = base.clone();
        while self.seen.contains_key(&slug) {
            let count = self.seen.entry(base.clone()).or_insert(0);
            *count += 1;
            slug = format!("{base}-{count}");
        }
        self.seen.insert(slug.clone(), 0);
        slug
    }
}

fn slugify(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('-'),
            '-' | '_' => Some(c),
            c if c.is_alphanumeric() => Some(c),
            _ => None,
        })
        .collect()
}
