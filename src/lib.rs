//! GitHub issues on a three-lane kanban board.
//!
//! Issues are fetched from the GitHub API, sorted into ToDo / In Progress /
//! Done, and kept in a local SQLite key/value store per repository. Moving
//! cards only changes the local board; nothing is written back to GitHub.

pub mod board;
pub mod classify;
pub mod config;
pub mod db;
pub mod drag;
pub mod github;
pub mod logging;
pub mod models;
pub mod tui;
