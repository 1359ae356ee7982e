use crate::models::{Bucket, Buckets, Issue, IssueState};

/// Lane an issue belongs in after a fresh load.
///
/// Closed issues are done whatever their assignee; open issues are in progress
/// once someone is assigned.
pub fn bucket_for(issue: &Issue) -> Bucket {
    match (issue.state, issue.is_assigned()) {
        (IssueState::Closed, _) => Bucket::Done,
        (IssueState::Open, false) => Bucket::Todo,
        (IssueState::Open, true) => Bucket::InProgress,
    }
}

/// Stable partition of `issues` into the three lanes.
pub fn classify(issues: Vec<Issue>) -> Buckets {
    let mut buckets = Buckets::default();
    for issue in issues {
        buckets.get_mut(bucket_for(&issue)).push(issue);
    }
    buckets
}
