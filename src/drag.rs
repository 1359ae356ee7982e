//! Drag and drop over the board.
//!
//! A gesture starts by naming the dragged issue and the lane it was picked
//! up from, and ends with an optional drop target. Ending always returns the
//! engine to idle. Within a lane the issue lands just before the target card
//! (or at the end); across lanes it always lands at the top of the
//! destination.

use crate::board::Board;
use crate::db::BoardStore;
use crate::models::{Bucket, Buckets, Issue};

/// Rendered size of the dragged card, used to size the floating preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlaySize {
    pub width: u16,
    pub height: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragSession {
    pub issue_id: i64,
    pub source: Bucket,
    pub overlay: Option<OverlaySize>,
}

/// Where a gesture ended: a lane, and optionally the card it was dropped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropTarget {
    pub bucket: Bucket,
    pub issue: Option<i64>,
}

impl DropTarget {
    pub fn lane(bucket: Bucket) -> Self {
        DropTarget {
            bucket,
            issue: None,
        }
    }

    pub fn card(bucket: Bucket, issue: i64) -> Self {
        DropTarget {
            bucket,
            issue: Some(issue),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// `end` without a session.
    Idle,
    /// Dropped outside any lane.
    Cancelled,
    /// Lookup miss or a drop that keeps the order as is.
    Unchanged,
    Reordered {
        bucket: Bucket,
        from: usize,
        to: usize,
    },
    Moved {
        from: Bucket,
        to: Bucket,
    },
}

impl DragOutcome {
    pub fn is_mutation(self) -> bool {
        matches!(self, DragOutcome::Reordered { .. } | DragOutcome::Moved { .. })
    }
}

#[derive(Debug, Default)]
pub struct DragEngine {
    session: Option<DragSession>,
}

impl DragEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn overlay(&self) -> Option<OverlaySize> {
        self.session.and_then(|s| s.overlay)
    }

    /// Begin dragging `issue_id` out of `source`. Replaces any session in
    /// progress.
    pub fn start(&mut self, issue_id: i64, source: Bucket, overlay: Option<OverlaySize>) {
        tracing::debug!(issue = issue_id, %source, "drag start");
        self.session = Some(DragSession {
            issue_id,
            source,
            overlay,
        });
    }

    /// Start a drag for an issue by looking up its lane on the board.
    pub fn start_on(&mut self, board: &Board, issue_id: i64, overlay: Option<OverlaySize>) -> bool {
        match board.locate(issue_id) {
            Some(loc) => {
                self.start(issue_id, loc.bucket, overlay);
                true
            }
            None => false,
        }
    }

    /// Issue under the cursor for preview rendering.
    pub fn active_issue<'a>(&self, board: &'a Board) -> Option<&'a Issue> {
        self.session.and_then(|s| board.issue(s.issue_id))
    }

    /// Finish the gesture and apply it to `board`, persisting on mutation.
    pub fn end(
        &mut self,
        board: &mut Board,
        store: &dyn BoardStore,
        drop: Option<DropTarget>,
    ) -> DragOutcome {
        let Some(session) = self.session.take() else {
            return DragOutcome::Idle;
        };
        let Some(target) = drop else {
            tracing::debug!(issue = session.issue_id, "drag cancelled");
            return DragOutcome::Cancelled;
        };

        let Some((next, outcome)) = commit(board.buckets(), &session, target) else {
            tracing::debug!(issue = session.issue_id, ?target, "drop ignored");
            return DragOutcome::Unchanged;
        };

        if let Err(e) = board.replace(next) {
            // Unreachable for a board that was consistent before the move.
            tracing::warn!("drop produced an inconsistent board: {}", e);
            return DragOutcome::Unchanged;
        }
        board.persist(store);
        tracing::debug!(issue = session.issue_id, ?outcome, "drop applied");
        outcome
    }
}

/// Next assignment for a drop, or `None` when nothing changes.
pub fn commit(
    buckets: &Buckets,
    session: &DragSession,
    target: DropTarget,
) -> Option<(Buckets, DragOutcome)> {
    let source = session.source;
    let from = buckets
        .get(source)
        .iter()
        .position(|i| i.id == session.issue_id)?;

    let mut next = buckets.clone();

    if source == target.bucket {
        if target.issue == Some(session.issue_id) {
            return None;
        }
        let lane = next.get_mut(source);
        let moved = lane.remove(from);
        let to = match target.issue {
            Some(before) => lane.iter().position(|i| i.id == before)?,
            None => lane.len(),
        };
        if to == from {
            return None;
        }
        lane.insert(to, moved);
        return Some((
            next,
            DragOutcome::Reordered {
                bucket: source,
                from,
                to,
            },
        ));
    }

    let moved = next.get_mut(source).remove(from);
    next.get_mut(target.bucket).insert(0, moved);
    Some((
        next,
        DragOutcome::Moved {
            from: source,
            to: target.bucket,
        },
    ))
}
