use anyhow::{bail, Result};

use ghkanban::board::Board;
use ghkanban::db::Database;
use ghkanban::drag::{DragEngine, DragOutcome, DropTarget};
use ghkanban::models::Bucket;

/// Apply one drag gesture from the command line: pick `issue_id` up and drop
/// it on `to`, optionally onto the card `before`.
pub fn run(
    db: &Database,
    repo_url: &str,
    issue_id: i64,
    to: Bucket,
    before: Option<i64>,
) -> Result<()> {
    let mut board = Board::restore(repo_url, db);

    if board.locate(issue_id).is_none() {
        bail!("Issue {} not found on the board for {}", issue_id, repo_url);
    }
    let target = match before {
        Some(card) => match board.locate(card) {
            Some(loc) if loc.bucket == to => DropTarget::card(to, card),
            Some(loc) => bail!("Issue {} is in {}, not {}", card, loc.bucket.title(), to.title()),
            None => bail!("Issue {} not found on the board for {}", card, repo_url),
        },
        None => DropTarget::lane(to),
    };

    let mut engine = DragEngine::new();
    engine.start_on(&board, issue_id, None);
    let number = board.issue(issue_id).map(|i| i.number).unwrap_or(issue_id);

    match engine.end(&mut board, db, Some(target)) {
        DragOutcome::Moved { from, to } => {
            println!("Moved #{} from {} to {}", number, from.title(), to.title());
        }
        DragOutcome::Reordered { bucket, to, .. } => {
            println!("Moved #{} to position {} in {}", number, to + 1, bucket.title());
        }
        _ => println!("Issue #{} is already there", number),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::issue;
    use ghkanban::db::{storage_key, BoardStore};
    use ghkanban::models::{Buckets, IssueState};

    const URL: &str = "https://github.com/o/r";

    fn setup_test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        let buckets = Buckets {
            todo: vec![
                issue(1, IssueState::Open, None),
                issue(2, IssueState::Open, None),
                issue(3, IssueState::Open, None),
            ],
            in_progress: vec![issue(4, IssueState::Open, Some("dev"))],
            done: Vec::new(),
        };
        db.save_board(&storage_key(URL), &buckets).unwrap();
        db
    }

    fn saved(db: &Database) -> Buckets {
        db.load_board(&storage_key(URL)).unwrap()
    }

    #[test]
    fn test_move_across_lanes_goes_to_top() {
        let db = setup_test_db();
        run(&db, URL, 2, Bucket::InProgress, None).unwrap();
        let buckets = saved(&db);
        assert_eq!(buckets.ids(Bucket::Todo), vec![1, 3]);
        assert_eq!(buckets.ids(Bucket::InProgress), vec![2, 4]);
    }

    #[test]
    fn test_reorder_before_card() {
        let db = setup_test_db();
        run(&db, URL, 1, Bucket::Todo, Some(3)).unwrap();
        assert_eq!(saved(&db).ids(Bucket::Todo), vec![2, 1, 3]);
    }

    #[test]
    fn test_reorder_to_end() {
        let db = setup_test_db();
        run(&db, URL, 1, Bucket::Todo, None).unwrap();
        assert_eq!(saved(&db).ids(Bucket::Todo), vec![2, 3, 1]);
    }

    #[test]
    fn test_unknown_issue() {
        let db = setup_test_db();
        assert!(run(&db, URL, 99, Bucket::Done, None).is_err());
        assert!(run(&db, URL, 1, Bucket::Todo, Some(99)).is_err());
    }

    #[test]
    fn test_before_card_in_other_lane() {
        let db = setup_test_db();
        let err = run(&db, URL, 1, Bucket::Todo, Some(4)).unwrap_err();
        assert!(err.to_string().contains("In Progress"));
        assert_eq!(saved(&db).ids(Bucket::Todo), vec![1, 2, 3]);
    }
}
