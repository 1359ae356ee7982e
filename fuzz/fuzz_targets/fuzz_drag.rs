#![no_main]

//! Fuzz target for drag gestures.
//!
//! Applies arbitrary sequences of drags to a board and checks that no issue
//! is lost or duplicated, and that every persisted state matches the board.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use ghkanban::board::Board;
use ghkanban::db::{BoardStore, Database};
use ghkanban::drag::{DragEngine, DropTarget};
use ghkanban::models::{Bucket, Buckets, Issue, IssueState, User};

const URL: &str = "https://github.com/fuzz/board";

#[derive(Arbitrary, Debug)]
enum Lane {
    Todo,
    InProgress,
    Done,
}

impl From<&Lane> for Bucket {
    fn from(lane: &Lane) -> Bucket {
        match lane {
            Lane::Todo => Bucket::Todo,
            Lane::InProgress => Bucket::InProgress,
            Lane::Done => Bucket::Done,
        }
    }
}

#[derive(Arbitrary, Debug)]
struct Gesture {
    /// Index into the current issues, or an unknown id when out of range
    issue: u8,
    /// Lane the gesture claims to start from, when it is not looked up
    claimed_source: Option<Lane>,
    /// None drops outside every lane
    lane: Option<Lane>,
    card: Option<u8>,
}

#[derive(Arbitrary, Debug)]
struct DragInput {
    todo: u8,
    in_progress: u8,
    done: u8,
    gestures: Vec<Gesture>,
}

fn issue(id: i64, state: IssueState) -> Issue {
    Issue {
        id,
        title: format!("Issue {}", id),
        number: id,
        user: User {
            login: "fuzz".to_string(),
            avatar_url: String::new(),
        },
        url: String::new(),
        html_url: String::new(),
        comments: 0,
        created_at: String::new(),
        assignee: None,
        state,
        opened_at: None,
    }
}

fn lane(range: std::ops::Range<i64>, state: IssueState) -> Vec<Issue> {
    range.map(|id| issue(id, state)).collect()
}

fuzz_target!(|input: DragInput| {
    let (t, p, d) = (
        (input.todo % 8) as i64,
        (input.in_progress % 8) as i64,
        (input.done % 8) as i64,
    );
    let buckets = Buckets {
        todo: lane(0..t, IssueState::Open),
        in_progress: lane(t..t + p, IssueState::Open),
        done: lane(t + p..t + p + d, IssueState::Closed),
    };
    let total = buckets.len();

    let Ok(db) = Database::open_in_memory() else {
        return;
    };
    let Ok(mut board) = Board::with_buckets(URL, buckets) else {
        return;
    };
    let mut engine = DragEngine::new();

    for gesture in input.gestures.iter().take(64) {
        let id = gesture.issue as i64 % (total as i64 + 2);
        match &gesture.claimed_source {
            Some(source) => engine.start(id, source.into(), None),
            None => {
                engine.start_on(&board, id, None);
            }
        }

        let target = gesture.lane.as_ref().map(|l| DropTarget {
            bucket: l.into(),
            issue: gesture.card.map(|c| c as i64 % (total as i64 + 2)),
        });
        let outcome = engine.end(&mut board, &db, target);

        assert!(!engine.is_dragging());
        assert_eq!(board.buckets().len(), total);
        for bucket in Bucket::ALL {
            for (pos, issue) in board.lane(bucket).iter().enumerate() {
                let loc = board.locate(issue.id).expect("indexed");
                assert_eq!((loc.bucket, loc.position), (bucket, pos));
            }
        }
        if outcome.is_mutation() {
            assert_eq!(db.load_board(&board.repo_key()).as_ref(), Some(board.buckets()));
        }
    }
});
