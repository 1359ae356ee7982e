use std::collections::HashMap;
use thiserror::Error;

use crate::classify::classify;
use crate::db::{repo_path, storage_key, BoardStore};
use crate::github::{FetchError, IssueSource};
use crate::models::{normalize_issues, Bucket, Buckets, Issue};

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("issue {0} appears in more than one place")]
    DuplicateIssue(i64),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Please enter a GitHub repo URL")]
    EmptyUrl,
    #[error("Failed to load issues")]
    Fetch(#[from] FetchError),
}

/// Where an issue currently sits on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub bucket: Bucket,
    pub position: usize,
}

/// Per-lane totals after a reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadSummary {
    pub todo: usize,
    pub in_progress: usize,
    pub done: usize,
}

/// The active repository and its bucket assignment.
///
/// The assignment is only ever replaced as a whole; the id index is rebuilt
/// on each replacement so every issue maps to exactly one location.
#[derive(Debug, Clone, Default)]
pub struct Board {
    repo_url: String,
    buckets: Buckets,
    index: HashMap<i64, Location>,
}

impl Board {
    pub fn new(repo_url: &str) -> Self {
        Board {
            repo_url: repo_url.to_string(),
            ..Board::default()
        }
    }

    pub fn with_buckets(repo_url: &str, buckets: Buckets) -> Result<Self, BoardError> {
        let index = build_index(&buckets)?;
        Ok(Board {
            repo_url: repo_url.to_string(),
            buckets,
            index,
        })
    }

    /// Board for `repo_url` as last persisted, or empty.
    pub fn restore(repo_url: &str, store: &dyn BoardStore) -> Self {
        match store.load_board(&storage_key(repo_url)) {
            Some(buckets) => Board::with_buckets(repo_url, buckets).unwrap_or_else(|e| {
                tracing::warn!(repo = repo_url, "discarding stored board: {}", e);
                Board::new(repo_url)
            }),
            None => Board::new(repo_url),
        }
    }

    pub fn repo_url(&self) -> &str {
        &self.repo_url
    }

    pub fn repo_key(&self) -> String {
        storage_key(&self.repo_url)
    }

    pub fn buckets(&self) -> &Buckets {
        &self.buckets
    }

    pub fn lane(&self, bucket: Bucket) -> &[Issue] {
        self.buckets.get(bucket)
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn locate(&self, id: i64) -> Option<Location> {
        self.index.get(&id).copied()
    }

    pub fn issue(&self, id: i64) -> Option<&Issue> {
        let loc = self.locate(id)?;
        self.buckets.get(loc.bucket).get(loc.position)
    }

    /// Swap in a new assignment. Leaves the board untouched on error.
    pub fn replace(&mut self, buckets: Buckets) -> Result<(), BoardError> {
        let index = build_index(&buckets)?;
        self.buckets = buckets;
        self.index = index;
        Ok(())
    }

    /// Point the board at another repository, restoring whatever was
    /// persisted for it.
    pub fn switch_repo(&mut self, repo_url: &str, store: &dyn BoardStore) {
        *self = Board::restore(repo_url, store);
    }

    /// Fetch, classify and persist the active repository's issues.
    pub fn reload(
        &mut self,
        source: &dyn IssueSource,
        store: &dyn BoardStore,
    ) -> Result<LoadSummary, LoadError> {
        if self.repo_url.trim().is_empty() {
            return Err(LoadError::EmptyUrl);
        }

        let path = repo_path(&self.repo_url);
        let issues = source.fetch_issues(&path).map_err(|e| {
            tracing::warn!(repo = %path, "fetch failed: {}", e);
            e
        })?;
        let buckets = classify(normalize_issues(issues));

        // Remote ids are unique; a duplicate means a broken response.
        if let Err(e) = self.replace(buckets) {
            tracing::warn!(repo = %path, "rejecting fetched issues: {}", e);
            return Err(LoadError::Fetch(FetchError::Decode(e.to_string())));
        }
        self.persist(store);

        Ok(LoadSummary {
            todo: self.buckets.todo.len(),
            in_progress: self.buckets.in_progress.len(),
            done: self.buckets.done.len(),
        })
    }

    /// Forget the persisted board and empty the lanes.
    pub fn reset(&mut self, store: &dyn BoardStore) {
        if let Err(e) = store.clear_board(&self.repo_key()) {
            tracing::warn!(repo = %self.repo_url, "failed to clear board: {:#}", e);
        }
        self.buckets = Buckets::default();
        self.index.clear();
    }

    pub(crate) fn persist(&self, store: &dyn BoardStore) {
        if let Err(e) = store.save_board(&self.repo_key(), &self.buckets) {
            tracing::warn!(repo = %self.repo_url, "failed to persist board: {:#}", e);
        }
    }
}

fn build_index(buckets: &Buckets) -> Result<HashMap<i64, Location>, BoardError> {
    let mut index = HashMap::with_capacity(buckets.len());
    for bucket in Bucket::ALL {
        for (position, issue) in buckets.get(bucket).iter().enumerate() {
            if index.insert(issue.id, Location { bucket, position }).is_some() {
                return Err(BoardError::DuplicateIssue(issue.id));
            }
        }
    }
    Ok(index)
}
