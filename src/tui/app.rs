//! Board application state and input handling.
//!
//! Nothing here touches the terminal; the event loop in `tui::run` feeds
//! events in and draws whatever state results.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use super::event::is_quit_event;
use super::hooks::{HitMap, Hook};
use crate::board::{Board, LoadError};
use crate::db::{repo_path, Database};
use crate::drag::{DragEngine, DragOutcome, DropTarget, OverlaySize};
use crate::github::IssueSource;
use crate::models::{Bucket, RepoInfo, Theme};

/// Terminals narrower than this show a single lane.
pub const NARROW_BREAKPOINT: u16 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

/// Selected slot. While dragging, `index` may equal the lane length to mean
/// "end of lane".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub bucket: Bucket,
    pub index: usize,
}

pub struct App<'a> {
    db: &'a Database,
    source: &'a dyn IssueSource,
    pub board: Board,
    pub engine: DragEngine,
    pub input: String,
    pub editing: bool,
    pub cursor: Cursor,
    pub width: u16,
    pub theme: Theme,
    pub loading: bool,
    pub notice: Option<Notice>,
    pub repo_info: Option<RepoInfo>,
    pub hits: HitMap,
    pub pointer: Option<(u16, u16)>,
    pub should_quit: bool,
}

impl<'a> App<'a> {
    pub fn new(db: &'a Database, source: &'a dyn IssueSource, repo_url: Option<String>) -> Self {
        let repo_url = match repo_url {
            Some(url) => url,
            None => db.last_repo_url().unwrap_or_else(|e| {
                tracing::warn!("failed to read last repository: {:#}", e);
                None
            })
            .unwrap_or_default(),
        };
        let theme = db.theme().unwrap_or_else(|e| {
            tracing::warn!("failed to read theme: {:#}", e);
            Theme::default()
        });

        let mut app = App {
            db,
            source,
            board: Board::restore(&repo_url, db),
            engine: DragEngine::new(),
            input: repo_url,
            editing: false,
            cursor: Cursor {
                bucket: Bucket::Todo,
                index: 0,
            },
            width: u16::MAX,
            theme,
            loading: false,
            notice: None,
            repo_info: None,
            hits: HitMap::default(),
            pointer: None,
            should_quit: false,
        };
        app.refresh_repo_info();
        app
    }

    pub fn is_narrow(&self) -> bool {
        self.width < NARROW_BREAKPOINT
    }

    pub fn resize(&mut self, width: u16) {
        self.width = width;
    }

    fn info(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            kind: NoticeKind::Info,
            text: text.into(),
        });
    }

    fn error(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            kind: NoticeKind::Error,
            text: text.into(),
        });
    }

    // ==================== Keyboard ====================

    pub fn handle_key(&mut self, key: KeyEvent) {
        // Quits from every mode; raw mode swallows SIGINT
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }
        if self.editing {
            self.handle_input_key(key);
            return;
        }
        if is_quit_event(&key) {
            self.should_quit = true;
            return;
        }

        match key.code {
            KeyCode::Char('/') | KeyCode::Char('u') => self.editing = true,
            KeyCode::Char('r') => self.request_load(),
            KeyCode::Char('R') => self.reset(),
            KeyCode::Char('t') => self.toggle_theme(),
            KeyCode::Char('o') => {
                if let Some(id) = self.focused_issue() {
                    self.open_link(id);
                }
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                if self.engine.is_dragging() {
                    self.drop_at_cursor();
                } else {
                    self.pick_up();
                }
            }
            KeyCode::Esc => {
                if self.engine.is_dragging() {
                    self.finish_drag(None);
                }
            }
            KeyCode::Left | KeyCode::Char('h') | KeyCode::BackTab | KeyCode::Char('[') => {
                self.move_lane(self.cursor.bucket.prev())
            }
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab | KeyCode::Char(']') => {
                self.move_lane(self.cursor.bucket.next())
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor.index = self.cursor.index.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.cursor.index = (self.cursor.index + 1).min(self.max_index(self.cursor.bucket));
            }
            _ => {}
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                self.editing = false;
                self.request_load();
            }
            KeyCode::Esc => {
                self.editing = false;
                self.commit_input();
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c)
                if key.modifiers == KeyModifiers::NONE || key.modifiers == KeyModifiers::SHIFT =>
            {
                self.input.push(c)
            }
            _ => {}
        }
    }

    // ==================== Mouse ====================

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        let (x, y) = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let hit = self.hits.at(x, y);
                if hit != Some(Hook::RepoUrlInput) && self.editing {
                    self.editing = false;
                    self.commit_input();
                }
                match hit {
                    Some(Hook::RepoUrlInput) => self.editing = true,
                    Some(Hook::LoadButton) => self.request_load(),
                    Some(Hook::ResetButton) => self.reset(),
                    Some(Hook::IssueLink(id)) => self.open_link(id),
                    Some(Hook::Issue(id)) => {
                        self.focus(id);
                        let overlay = self.overlay_for(id);
                        self.engine.start_on(&self.board, id, overlay);
                        self.pointer = Some((x, y));
                    }
                    Some(Hook::Column(bucket)) => self.move_lane(bucket),
                    None => {}
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if self.engine.is_dragging() {
                    self.pointer = Some((x, y));
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if self.engine.is_dragging() {
                    let target = self.drop_target_at(x, y);
                    self.finish_drag(target);
                }
            }
            _ => {}
        }
    }

    fn drop_target_at(&self, x: u16, y: u16) -> Option<DropTarget> {
        match self.hits.at(x, y)? {
            Hook::Issue(id) | Hook::IssueLink(id) => self
                .board
                .locate(id)
                .map(|loc| DropTarget::card(loc.bucket, id)),
            Hook::Column(bucket) => Some(DropTarget::lane(bucket)),
            _ => None,
        }
    }

    // ==================== Drag and drop ====================

    fn overlay_for(&self, id: i64) -> Option<OverlaySize> {
        self.hits.rect(Hook::Issue(id)).map(|r| OverlaySize {
            width: r.width,
            height: r.height,
        })
    }

    fn pick_up(&mut self) {
        if let Some(id) = self.focused_issue() {
            let overlay = self.overlay_for(id);
            self.engine.start_on(&self.board, id, overlay);
            self.pointer = None;
        }
    }

    fn drop_at_cursor(&mut self) {
        let issue = self
            .board
            .lane(self.cursor.bucket)
            .get(self.cursor.index)
            .map(|i| i.id);
        let target = DropTarget {
            bucket: self.cursor.bucket,
            issue,
        };
        self.finish_drag(Some(target));
    }

    fn finish_drag(&mut self, target: Option<DropTarget>) {
        let dragged = self.engine.session().map(|s| s.issue_id);
        let outcome = self.engine.end(&mut self.board, self.db, target);
        self.pointer = None;

        if let Some(id) = dragged {
            if outcome.is_mutation() {
                self.focus(id);
            }
            if let DragOutcome::Moved { to, .. } = outcome {
                if let Some(issue) = self.board.issue(id) {
                    let text = format!("Moved #{} to {}", issue.number, to.title());
                    self.info(text);
                }
            }
        }
        self.clamp_cursor();
    }

    // ==================== Cursor ====================

    fn max_index(&self, bucket: Bucket) -> usize {
        let len = self.board.lane(bucket).len();
        if self.engine.is_dragging() {
            len
        } else {
            len.saturating_sub(1)
        }
    }

    fn move_lane(&mut self, bucket: Bucket) {
        self.cursor.bucket = bucket;
        self.clamp_cursor();
    }

    fn clamp_cursor(&mut self) {
        self.cursor.index = self.cursor.index.min(self.max_index(self.cursor.bucket));
    }

    fn focus(&mut self, id: i64) {
        if let Some(loc) = self.board.locate(id) {
            self.cursor = Cursor {
                bucket: loc.bucket,
                index: loc.position,
            };
        }
    }

    pub fn focused_issue(&self) -> Option<i64> {
        self.board
            .lane(self.cursor.bucket)
            .get(self.cursor.index)
            .map(|i| i.id)
    }

    // ==================== Board actions ====================

    /// Point the board at whatever URL is in the input box.
    fn commit_input(&mut self) {
        if self.input == self.board.repo_url() {
            return;
        }
        self.engine = DragEngine::new();
        self.board.switch_repo(&self.input, self.db);
        if let Err(e) = self.db.set_last_repo_url(&self.input) {
            tracing::warn!("failed to remember repository: {:#}", e);
        }
        self.repo_info = None;
        self.clamp_cursor();
    }

    /// Validate and mark a load as pending; the event loop draws the pending
    /// state and then calls [`App::run_pending_load`].
    pub fn request_load(&mut self) {
        if self.loading {
            return;
        }
        if self.input.trim().is_empty() {
            self.error(LoadError::EmptyUrl.to_string());
            return;
        }
        self.commit_input();
        self.loading = true;
        self.notice = None;
    }

    pub fn run_pending_load(&mut self) {
        if !self.loading {
            return;
        }
        self.engine = DragEngine::new();
        match self.board.reload(self.source, self.db) {
            Ok(summary) => {
                if let Err(e) = self.db.set_last_repo_url(self.board.repo_url()) {
                    tracing::warn!("failed to remember repository: {:#}", e);
                }
                self.info(format!(
                    "Loaded {} issues ({} to do, {} in progress, {} done)",
                    summary.todo + summary.in_progress + summary.done,
                    summary.todo,
                    summary.in_progress,
                    summary.done
                ));
                self.refresh_repo_info();
            }
            Err(e) => self.error(e.to_string()),
        }
        self.loading = false;
        self.clamp_cursor();
    }

    fn refresh_repo_info(&mut self) {
        self.repo_info = None;
        if self.board.repo_url().trim().is_empty() {
            return;
        }
        match self.source.fetch_repo_info(&repo_path(self.board.repo_url())) {
            Ok(info) => self.repo_info = Some(info),
            Err(e) => tracing::debug!("no repository metadata: {}", e),
        }
    }

    pub fn reset(&mut self) {
        self.engine = DragEngine::new();
        self.board.reset(self.db);
        self.board = Board::new("");
        self.input.clear();
        if let Err(e) = self.db.set_last_repo_url("") {
            tracing::warn!("failed to forget repository: {:#}", e);
        }
        self.repo_info = None;
        self.cursor = Cursor {
            bucket: Bucket::Todo,
            index: 0,
        };
        self.info("Board has been reset.");
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        if let Err(e) = self.db.set_theme(self.theme) {
            tracing::warn!("failed to save theme: {:#}", e);
        }
    }

    fn open_link(&mut self, id: i64) {
        let Some(url) = self.board.issue(id).map(|i| i.html_url.clone()) else {
            return;
        };
        if url.is_empty() {
            return;
        }
        if let Err(e) = open::that(&url) {
            tracing::warn!(%url, "failed to open link: {}", e);
            self.error(format!("Could not open {}", url));
        }
    }
}
