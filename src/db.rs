use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::models::{Buckets, Theme};

const SCHEMA_VERSION: i32 = 1;

const BOARD_KEY_PREFIX: &str = "kanban_issues_";
const REPO_URL_KEY: &str = "kanban_repo_url";
const THEME_KEY: &str = "kanban_theme";
const GITHUB_PREFIX: &str = "https://github.com/";

/// `owner/name` part of a repository URL.
///
/// Only the first `https://github.com/` is stripped; nothing else is
/// canonicalized, so `https://github.com/o/r/` and `https://github.com/O/r`
/// are different repositories here.
pub fn repo_path(repo_url: &str) -> String {
    repo_url.replacen(GITHUB_PREFIX, "", 1)
}

/// Storage slot for a repository's board.
pub fn storage_key(repo_url: &str) -> String {
    format!("{}{}", BOARD_KEY_PREFIX, repo_path(repo_url))
}

/// Keyed persistence of bucket assignments.
pub trait BoardStore {
    fn save_board(&self, key: &str, buckets: &Buckets) -> Result<()>;

    /// Most recently saved assignment for `key`, normalized.
    ///
    /// Corrupt values are logged and reported as absent.
    fn load_board(&self, key: &str) -> Option<Buckets>;

    fn clear_board(&self, key: &str) -> Result<()>;
}

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).context("Failed to open database")?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        let version: i32 = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap_or(0);

        if version < SCHEMA_VERSION {
            self.conn.execute_batch(
                r#"
                -- Plain key/value entries, overwritten wholesale on write
                CREATE TABLE IF NOT EXISTS entries (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );
                "#,
            )?;

            self.conn
                .execute_batch(&format!("PRAGMA user_version = {}", SCHEMA_VERSION))?;
        }

        Ok(())
    }

    // Raw entries
    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM entries WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO entries (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn remove_item(&self, key: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM entries WHERE key = ?1", [key])?;
        Ok(rows > 0)
    }

    /// Repository paths that have a saved board.
    pub fn tracked_repos(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM entries WHERE key LIKE ?1 ORDER BY key")?;
        let keys = stmt
            .query_map([format!("{}%", BOARD_KEY_PREFIX)], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(keys
            .into_iter()
            .filter_map(|key| key.strip_prefix(BOARD_KEY_PREFIX).map(str::to_string))
            .collect())
    }

    // Preferences
    pub fn last_repo_url(&self) -> Result<Option<String>> {
        Ok(self.get_item(REPO_URL_KEY)?.filter(|url| !url.is_empty()))
    }

    pub fn set_last_repo_url(&self, repo_url: &str) -> Result<()> {
        self.set_item(REPO_URL_KEY, repo_url)
    }

    pub fn theme(&self) -> Result<Theme> {
        let theme = match self.get_item(THEME_KEY)? {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!(value = %raw, "ignoring stored theme: {}", e);
                Theme::default()
            }),
            None => Theme::default(),
        };
        Ok(theme)
    }

    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        self.set_item(THEME_KEY, theme.as_str())
    }
}

impl BoardStore for Database {
    fn save_board(&self, key: &str, buckets: &Buckets) -> Result<()> {
        let json = serde_json::to_string(buckets).context("Failed to serialize board")?;
        self.set_item(key, &json)
            .with_context(|| format!("Failed to save board {}", key))?;
        tracing::debug!(key, issues = buckets.len(), "saved board");
        Ok(())
    }

    fn load_board(&self, key: &str) -> Option<Buckets> {
        let raw = match self.get_item(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key, "failed to read stored board: {:#}", e);
                return None;
            }
        };
        decode_board(key, &raw)
    }

    fn clear_board(&self, key: &str) -> Result<()> {
        if self.remove_item(key)? {
            tracing::debug!(key, "cleared board");
        }
        Ok(())
    }
}

/// Parse a stored board, failing closed on malformed or duplicated content.
pub fn decode_board(key: &str, raw: &str) -> Option<Buckets> {
    let buckets: Buckets = match serde_json::from_str(raw) {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(key, "failed to parse stored board: {}", e);
            return None;
        }
    };

    let mut seen = std::collections::HashSet::new();
    if let Some((_, dup)) = buckets.iter().find(|(_, issue)| !seen.insert(issue.id)) {
        tracing::warn!(key, issue = dup.id, "stored board lists an issue twice");
        return None;
    }

    Some(buckets.normalized())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::buckets;
    use crate::models::Bucket;
    use proptest::prelude::*;
    use tempfile::tempdir;

    fn setup_test_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(&db_path).unwrap();
        (db, dir)
    }

    // ==================== Unit Tests ====================

    #[test]
    fn test_repo_path_strips_prefix() {
        assert_eq!(repo_path("https://github.com/facebook/react"), "facebook/react");
        assert_eq!(repo_path("facebook/react"), "facebook/react");
    }

    #[test]
    fn test_repo_path_strips_only_first_prefix() {
        assert_eq!(
            repo_path("https://github.com/https://github.com/x"),
            "https://github.com/x"
        );
    }

    #[test]
    fn test_storage_key_collisions_preserved() {
        // Same slot for a URL and its bare path, distinct slots for cosmetic variants.
        assert_eq!(
            storage_key("https://github.com/o/r"),
            storage_key("o/r")
        );
        assert_ne!(
            storage_key("https://github.com/o/r"),
            storage_key("https://github.com/o/r/")
        );
        assert_ne!(
            storage_key("https://github.com/o/r"),
            storage_key("https://github.com/O/r")
        );
        assert_eq!(storage_key("https://github.com/o/r"), "kanban_issues_o/r");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let (db, _dir) = setup_test_db();
        let board = buckets(&[1, 2], &[3], &[4]);
        db.save_board("kanban_issues_o/r", &board).unwrap();

        let loaded = db.load_board("kanban_issues_o/r").unwrap();
        assert_eq!(loaded, board);
        assert_eq!(loaded.todo[0].opened_display(), "2024-03-01");
    }

    #[test]
    fn test_load_missing_key() {
        let (db, _dir) = setup_test_db();
        assert!(db.load_board("kanban_issues_nope").is_none());
    }

    #[test]
    fn test_save_overwrites() {
        let (db, _dir) = setup_test_db();
        db.save_board("k", &buckets(&[1], &[], &[])).unwrap();
        db.save_board("k", &buckets(&[], &[], &[1])).unwrap();

        let loaded = db.load_board("k").unwrap();
        assert!(loaded.todo.is_empty());
        assert_eq!(loaded.ids(Bucket::Done), vec![1]);
    }

    #[test]
    fn test_malformed_value_fails_closed() {
        let (db, _dir) = setup_test_db();
        db.set_item("kanban_issues_o/r", "{not json").unwrap();
        assert!(db.load_board("kanban_issues_o/r").is_none());

        db.set_item("kanban_issues_o/r", r#"{"todo": 3}"#).unwrap();
        assert!(db.load_board("kanban_issues_o/r").is_none());
    }

    #[test]
    fn test_duplicate_issue_fails_closed() {
        let (db, _dir) = setup_test_db();
        let mut board = buckets(&[1], &[], &[]);
        board.done.push(board.todo[0].clone());
        let json = serde_json::to_string(&board).unwrap();
        db.set_item("k", &json).unwrap();
        assert!(db.load_board("k").is_none());
    }

    #[test]
    fn test_clear_board_is_idempotent() {
        let (db, _dir) = setup_test_db();
        db.save_board("k", &buckets(&[1], &[2], &[3])).unwrap();
        db.clear_board("k").unwrap();
        assert!(db.load_board("k").is_none());
        db.clear_board("k").unwrap();
        assert!(db.load_board("k").is_none());
    }

    #[test]
    fn test_boards_are_independent_per_key() {
        let (db, _dir) = setup_test_db();
        db.save_board(&storage_key("a/one"), &buckets(&[1], &[], &[])).unwrap();
        db.save_board(&storage_key("b/two"), &buckets(&[], &[2], &[])).unwrap();
        db.clear_board(&storage_key("a/one")).unwrap();

        assert!(db.load_board(&storage_key("a/one")).is_none());
        assert!(db.load_board(&storage_key("b/two")).is_some());
        assert_eq!(db.tracked_repos().unwrap(), vec!["b/two".to_string()]);
    }

    #[test]
    fn test_last_repo_url() {
        let (db, _dir) = setup_test_db();
        assert!(db.last_repo_url().unwrap().is_none());
        db.set_last_repo_url("https://github.com/o/r").unwrap();
        assert_eq!(
            db.last_repo_url().unwrap().as_deref(),
            Some("https://github.com/o/r")
        );
        db.set_last_repo_url("").unwrap();
        assert!(db.last_repo_url().unwrap().is_none());
    }

    #[test]
    fn test_theme_preference() {
        let (db, _dir) = setup_test_db();
        assert_eq!(db.theme().unwrap(), Theme::Light);
        db.set_theme(Theme::Dark).unwrap();
        assert_eq!(db.theme().unwrap(), Theme::Dark);
        db.set_item("kanban_theme", "sepia").unwrap();
        assert_eq!(db.theme().unwrap(), Theme::Light);
    }

    #[test]
    fn test_reopen_keeps_entries() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("board.db");
        {
            let db = Database::open(&db_path).unwrap();
            db.save_board("k", &buckets(&[1], &[], &[])).unwrap();
        }
        let db = Database::open(&db_path).unwrap();
        assert_eq!(db.load_board("k").unwrap().ids(Bucket::Todo), vec![1]);
    }

    // ==================== Property-Based Tests ====================

    proptest! {
        #[test]
        fn prop_round_trip(
            todo in proptest::collection::vec(1i64..1000, 0..8),
            extra in proptest::collection::vec(1000i64..2000, 0..8),
        ) {
            let mut todo = todo;
            todo.sort_unstable();
            todo.dedup();
            let mut done = extra;
            done.sort_unstable();
            done.dedup();

            let db = Database::open_in_memory().unwrap();
            let board = buckets(&todo, &[], &done);
            db.save_board("k", &board).unwrap();
            prop_assert_eq!(db.load_board("k").unwrap(), board);
        }

        #[test]
        fn prop_garbage_never_panics(raw in ".{0,200}") {
            let db = Database::open_in_memory().unwrap();
            db.set_item("k", &raw).unwrap();
            let _ = db.load_board("k");
        }
    }
}
