//! Front-matter decoding and validation.
//!
//! The parser hands over front-matter as untyped data. This module decodes it
//! into a [`Frontmatter`] record, checking every field independently so one
//! document can report several problems at once:
//!
//! ```yaml
//! title: Pure functions      # string, required
//! slug: pure-functions       # string, required
//! order: 2                   # number, required
//! state: release             # draft | outline | release, required
//! parent: intro              # string, optional
//! ```
//!
//! Unknown keys are ignored. A document without any front-matter decodes as
//! an empty mapping and reports every required field as missing.
//!
//! Decoding never fails outright. [`validate`] returns a [`Validated`] that is
//! either the decoded record or a fallback default plus the list of
//! [`Violation`]s. Lenient callers take the fallback, strict callers turn the
//! violations into a [`FrontmatterError`].

use crate::lifecycle::LifecycleState;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Order given to documents whose front-matter could not be decoded.
pub const DEFAULT_ORDER: f64 = 99.0;

const STATE_TYPE: &str = r#""draft" | "outline" | "release""#;

#[derive(Error, Debug)]
#[error("invalid front-matter in {}: {}", .path.display(), join_violations(.violations))]
pub struct FrontmatterError {
    pub path: PathBuf,
    pub violations: Vec<Violation>,
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validated document metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frontmatter {
    pub title: String,
    pub slug: String,
    pub order: f64,
    pub state: LifecycleState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl Default for Frontmatter {
    fn default() -> Self {
        Self {
            title: String::new(),
            slug: String::new(),
            order: DEFAULT_ORDER,
            state: LifecycleState::Outline,
            parent: None,
        }
    }
}

/// One field that did not match the schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// Dotted path of the field, e.g. `frontmatter.slug`.
    pub path: String,
    /// Name of the expected type.
    pub expected: &'static str,
    /// Offending value; `None` when the field is missing.
    pub actual: Option<Value>,
}

impl Violation {
    fn new(field: &str, expected: &'static str, actual: Option<&Value>) -> Self {
        Self {
            path: format!("frontmatter.{field}"),
            expected,
            actual: actual.cloned(),
        }
    }

    fn actual_display(&self) -> String {
        match &self.actual {
            Some(value) => serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()),
            None => "undefined".to_string(),
        }
    }

    /// Diagnostic line naming the source document.
    pub fn report(&self, chapter: &std::path::Path) -> String {
        format!(
            "Expected value of type {} at {}, for chapter {}, but got {}.",
            self.expected,
            self.path,
            chapter.display(),
            self.actual_display()
        )
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Expected value of type {} at {}, but got {}",
            self.expected,
            self.path,
            self.actual_display()
        )
    }
}

/// Outcome of decoding front-matter.
#[derive(Debug, Clone, PartialEq)]
pub enum Validated {
    Valid(Frontmatter),
    Invalid {
        fallback: Frontmatter,
        violations: Vec<Violation>,
    },
}

impl Validated {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Valid(_) => &[],
            Self::Invalid { violations, .. } => violations,
        }
    }

    /// The decoded record, or the default substitute.
    pub fn into_lenient(self) -> Frontmatter {
        match self {
            Self::Valid(fm) => fm,
            Self::Invalid { fallback, .. } => fallback,
        }
    }

    /// The decoded record, or an error carrying every violation.
    pub fn into_strict(self, path: impl Into<PathBuf>) -> Result<Frontmatter, FrontmatterError> {
        match self {
            Self::Valid(fm) => Ok(fm),
            Self::Invalid { violations, .. } => Err(FrontmatterError {
                path: path.into(),
                violations,
            }),
        }
    }
}

/// Decode untyped front-matter into a [`Frontmatter`].
pub fn validate(data: &Value) -> Validated {
    let empty = Map::new();
    let fields = data.as_object().unwrap_or(&empty);
    let mut violations = Vec::new();

    let title = required_string(fields, "title", &mut violations);
    let slug = required_string(fields, "slug", &mut violations);

    let order = match fields.get("order") {
        Some(value) => value.as_f64().filter(|n| n.is_finite()),
        None => None,
    };
    if order.is_none() {
        violations.push(Violation::new("order", "number", fields.get("order")));
    }

    let state = fields
        .get("state")
        .and_then(Value::as_str)
        .and_then(LifecycleState::parse);
    if state.is_none() {
        violations.push(Violation::new("state", STATE_TYPE, fields.get("state")));
    }

    let parent = match fields.get("parent") {
        None => None,
        // An empty parent means top level.
        Some(Value::String(parent)) if parent.is_empty() => None,
        Some(Value::String(parent)) => Some(parent.clone()),
        Some(other) => {
            violations.push(Violation::new("parent", "string", Some(other)));
            None
        }
    };

    match (title, slug, order, state) {
        (Some(title), Some(slug), Some(order), Some(state)) if violations.is_empty() => {
            Validated::Valid(Frontmatter {
                title,
                slug,
                order,
                state,
                parent,
            })
        }
        _ => Validated::Invalid {
            fallback: Frontmatter::default(),
            violations,
        },
    }
}

fn required_string(
    fields: &Map<String, Value>,
    key: &str,
    violations: &mut Vec<Violation>,
) -> Option<String> {
    match fields.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        other => {
            violations.push(Violation::new(key, "string", other));
            None
        }
    }
}
