use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignee {
    pub login: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

impl IssueState {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueState::Open => "open",
            IssueState::Closed => "closed",
        }
    }
}

/// A snapshot of one remote issue record.
///
/// `opened_at` is derived from the raw `created_at` string and is never
/// serialized; call [`Issue::normalized`] after deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: i64,
    pub title: String,
    pub number: i64,
    pub user: User,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub comments: u32,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub assignee: Option<Assignee>,
    pub state: IssueState,
    #[serde(skip)]
    pub opened_at: Option<DateTime<Utc>>,
}

impl Issue {
    /// Re-derive the creation timestamp from the raw `created_at` value.
    pub fn normalized(mut self) -> Self {
        self.opened_at = parse_timestamp(&self.created_at);
        self
    }

    pub fn is_assigned(&self) -> bool {
        self.assignee.is_some()
    }

    /// Date shown on cards, `Unknown` when the raw timestamp does not parse.
    pub fn opened_display(&self) -> String {
        match self.opened_at {
            Some(dt) => dt.format("%Y-%m-%d").to_string(),
            None => "Unknown".to_string(),
        }
    }
}

/// Shorten `s` to at most `max_chars` characters, marking the cut with `...`
/// when there is room for it.
pub fn truncate(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_chars {
        s.to_string()
    } else if max_chars < 3 {
        s.chars().take(max_chars).collect()
    } else {
        let truncated: String = s.chars().take(max_chars - 3).collect();
        format!("{}...", truncated)
    }
}

pub fn normalize_issues(issues: Vec<Issue>) -> Vec<Issue> {
    issues.into_iter().map(Issue::normalized).collect()
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Bucket {
    Todo,
    InProgress,
    Done,
}

impl Bucket {
    /// Fixed lane order, also the order used when searching for an issue.
    pub const ALL: [Bucket; 3] = [Bucket::Todo, Bucket::InProgress, Bucket::Done];

    pub fn key(self) -> &'static str {
        match self {
            Bucket::Todo => "todo",
            Bucket::InProgress => "inProgress",
            Bucket::Done => "done",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Bucket::Todo => "ToDo",
            Bucket::InProgress => "In Progress",
            Bucket::Done => "Done",
        }
    }

    pub fn next(self) -> Bucket {
        match self {
            Bucket::Todo => Bucket::InProgress,
            Bucket::InProgress => Bucket::Done,
            Bucket::Done => Bucket::Todo,
        }
    }

    pub fn prev(self) -> Bucket {
        match self {
            Bucket::Todo => Bucket::Done,
            Bucket::InProgress => Bucket::Todo,
            Bucket::Done => Bucket::InProgress,
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Bucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(Bucket::Todo),
            "inProgress" | "in-progress" => Ok(Bucket::InProgress),
            "done" => Ok(Bucket::Done),
            other => Err(format!(
                "Invalid bucket '{}'. Must be one of: todo, inProgress, done",
                other
            )),
        }
    }
}

/// The three ordered lanes of a board.
///
/// Serialized as `{"todo": [...], "inProgress": [...], "done": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buckets {
    pub todo: Vec<Issue>,
    #[serde(rename = "inProgress")]
    pub in_progress: Vec<Issue>,
    pub done: Vec<Issue>,
}

impl Buckets {
    pub fn get(&self, bucket: Bucket) -> &[Issue] {
        match bucket {
            Bucket::Todo => &self.todo,
            Bucket::InProgress => &self.in_progress,
            Bucket::Done => &self.done,
        }
    }

    pub fn get_mut(&mut self, bucket: Bucket) -> &mut Vec<Issue> {
        match bucket {
            Bucket::Todo => &mut self.todo,
            Bucket::InProgress => &mut self.in_progress,
            Bucket::Done => &mut self.done,
        }
    }

    pub fn len(&self) -> usize {
        self.todo.len() + self.in_progress.len() + self.done.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every issue paired with its bucket, in fixed lane order.
    pub fn iter(&self) -> impl Iterator<Item = (Bucket, &Issue)> {
        Bucket::ALL
            .into_iter()
            .flat_map(move |b| self.get(b).iter().map(move |i| (b, i)))
    }

    pub fn ids(&self, bucket: Bucket) -> Vec<i64> {
        self.get(bucket).iter().map(|i| i.id).collect()
    }

    pub fn normalized(self) -> Self {
        Buckets {
            todo: normalize_issues(self.todo),
            in_progress: normalize_issues(self.in_progress),
            done: normalize_issues(self.done),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoOwner {
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
}

/// Repository metadata shown in the board header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoInfo {
    pub full_name: String,
    pub owner: RepoOwner,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("Invalid theme '{}'. Must be light or dark", other)),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    const RAW_ISSUE: &str = r#"{
        "id": 1001,
        "title": "Crash on start",
        "number": 7,
        "user": {"login": "octocat", "avatar_url": "https://example.com/a.png"},
        "url": "https://api.github.com/repos/o/r/issues/7",
        "html_url": "https://github.com/o/r/issues/7",
        "comments": 3,
        "created_at": "2024-01-15T08:00:00Z",
        "assignee": null,
        "state": "open",
        "labels": []
    }"#;

    #[test]
    fn test_deserialize_remote_issue() {
        let issue: Issue = serde_json::from_str(RAW_ISSUE).unwrap();
        assert_eq!(issue.id, 1001);
        assert_eq!(issue.number, 7);
        assert_eq!(issue.state, IssueState::Open);
        assert!(issue.assignee.is_none());
        assert!(issue.opened_at.is_none());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer title", 8), "a lon...");
        assert_eq!(truncate("日本語のタイトル", 5), "日本...");
        assert_eq!(truncate("héllo wörld", 8), "héllo...");
        assert_eq!(truncate("abc", 2), "ab");
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn test_normalized_derives_timestamp() {
        let issue: Issue = serde_json::from_str(RAW_ISSUE).unwrap();
        let issue = issue.normalized();
        assert_eq!(issue.opened_display(), "2024-01-15");
    }

    #[test]
    fn test_unparseable_timestamp_displays_unknown() {
        let mut issue = fixtures::open(1);
        issue.created_at = "yesterday".to_string();
        let issue = issue.normalized();
        assert!(issue.opened_at.is_none());
        assert_eq!(issue.opened_display(), "Unknown");
    }

    #[test]
    fn test_opened_at_not_serialized() {
        let json = serde_json::to_string(&fixtures::open(1)).unwrap();
        assert!(!json.contains("opened_at"));
        assert!(json.contains("\"created_at\":\"2024-03-01T12:30:00Z\""));
    }

    #[test]
    fn test_buckets_wire_keys() {
        let json = serde_json::to_string(&Buckets::default()).unwrap();
        assert_eq!(json, r#"{"todo":[],"inProgress":[],"done":[]}"#);
    }

    #[test]
    fn test_bucket_parse_and_display() {
        for bucket in Bucket::ALL {
            assert_eq!(bucket.key().parse::<Bucket>().unwrap(), bucket);
        }
        assert_eq!("in-progress".parse::<Bucket>().unwrap(), Bucket::InProgress);
        assert!("doing".parse::<Bucket>().is_err());
        assert_eq!(Bucket::InProgress.title(), "In Progress");
    }

    #[test]
    fn test_bucket_cycle() {
        for bucket in Bucket::ALL {
            assert_eq!(bucket.next().prev(), bucket);
        }
    }

    #[test]
    fn test_iter_follows_lane_order() {
        let buckets = fixtures::buckets(&[1, 2], &[3], &[4]);
        let order: Vec<(Bucket, i64)> = buckets.iter().map(|(b, i)| (b, i.id)).collect();
        assert_eq!(
            order,
            vec![
                (Bucket::Todo, 1),
                (Bucket::Todo, 2),
                (Bucket::InProgress, 3),
                (Bucket::Done, 4)
            ]
        );
        assert_eq!(buckets.len(), 4);
    }

    #[test]
    fn test_theme_toggle_and_parse() {
        assert_eq!(Theme::default(), Theme::Light);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("blue".parse::<Theme>().is_err());
    }
}
