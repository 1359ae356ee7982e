//! Stable identifiers for every interactive region of the board.
//!
//! The renderer registers each region it draws; mouse handling and UI tests
//! resolve positions and identifiers through the same map.

use ratatui::layout::{Position, Rect};
use std::fmt;

use crate::models::Bucket;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    RepoUrlInput,
    LoadButton,
    ResetButton,
    Column(Bucket),
    Issue(i64),
    IssueLink(i64),
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hook::RepoUrlInput => f.write_str("repo-url-input"),
            Hook::LoadButton => f.write_str("load-issues-btn"),
            Hook::ResetButton => f.write_str("reset-board-btn"),
            Hook::Column(bucket) => write!(f, "column-{}", bucket.key()),
            Hook::Issue(id) => write!(f, "issue-{}", id),
            Hook::IssueLink(id) => write!(f, "issue-link-{}", id),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HitMap {
    regions: Vec<(Hook, Rect)>,
}

impl HitMap {
    pub fn clear(&mut self) {
        self.regions.clear();
    }

    /// Register a region. Later registrations win when regions overlap, so
    /// containers go in before their contents.
    pub fn register(&mut self, hook: Hook, area: Rect) {
        if area.width > 0 && area.height > 0 {
            self.regions.push((hook, area));
        }
    }

    pub fn at(&self, x: u16, y: u16) -> Option<Hook> {
        let pos = Position { x, y };
        self.regions
            .iter()
            .rev()
            .find(|(_, rect)| rect.contains(pos))
            .map(|(hook, _)| *hook)
    }

    pub fn rect(&self, hook: Hook) -> Option<Rect> {
        self.regions
            .iter()
            .find(|(h, _)| *h == hook)
            .map(|(_, rect)| *rect)
    }

    /// Look a region up by its string identifier.
    pub fn by_id(&self, id: &str) -> Option<(Hook, Rect)> {
        self.regions
            .iter()
            .find(|(hook, _)| hook.to_string() == id)
            .copied()
    }
}
