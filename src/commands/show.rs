use anyhow::Result;

use ghkanban::board::Board;
use ghkanban::db::Database;
use ghkanban::models::{truncate, Bucket, Issue};

fn print_issue(issue: &Issue) {
    let assignee = issue
        .assignee
        .as_ref()
        .map(|a| format!("@{}", a.login))
        .unwrap_or_default();
    println!(
        "  #{:<6} {:<50} {:>3} comments  {:10} {}",
        issue.number,
        truncate(&issue.title, 50),
        issue.comments,
        issue.opened_display(),
        assignee
    );
}

pub fn run(db: &Database, repo_url: &str, bucket: Option<Bucket>) -> Result<()> {
    let board = Board::restore(repo_url, db);

    if board.is_empty() {
        println!("No saved board for {}.", repo_url);
        println!("Use 'ghkanban load {}' to fetch its issues.", repo_url);
        let tracked = db.tracked_repos()?;
        if !tracked.is_empty() {
            println!("\nSaved boards:");
            for path in tracked {
                println!("  {}", path);
            }
        }
        return Ok(());
    }

    let lanes: Vec<Bucket> = match bucket {
        Some(b) => vec![b],
        None => Bucket::ALL.to_vec(),
    };

    for lane in lanes {
        let issues = board.lane(lane);
        println!("{} ({})", lane.title(), issues.len());
        for issue in issues {
            print_issue(issue);
        }
        println!();
    }

    Ok(())
}
