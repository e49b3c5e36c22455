//! Publication lifecycle.
//!
//! Every document declares a `state`. Which states get published depends on
//! the build mode:
//!
//! | State     | Preview | Production |
//! |-----------|---------|------------|
//! | `draft`   | yes     | yes        |
//! | `outline` | yes     | no         |
//! | `release` | yes     | yes        |
//!
//! Preview builds exist so authors can see outlines in context before they
//! are written up.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared lifecycle state of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Draft,
    Outline,
    Release,
}

impl LifecycleState {
    pub const ALL: [LifecycleState; 3] = [Self::Draft, Self::Outline, Self::Release];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Outline => "outline",
            Self::Release => "release",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which documents a build publishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum BuildMode {
    /// Author build: every document, outlines included.
    Preview,
    /// Published build: drafts and releases only.
    #[default]
    Production,
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preview => f.write_str("preview"),
            Self::Production => f.write_str("production"),
        }
    }
}

/// Whether a document in `state` is published in `mode`.
pub fn admits(mode: BuildMode, state: LifecycleState) -> bool {
    match mode {
        BuildMode::Preview => true,
        BuildMode::Production => matches!(state, LifecycleState::Draft | LifecycleState::Release),
    }
}
