use anyhow::{bail, Result};

use ghkanban::board::{Board, LoadError};
use ghkanban::db::Database;
use ghkanban::github::IssueSource;

pub fn run(db: &Database, source: &dyn IssueSource, repo_url: &str) -> Result<()> {
    let mut board = Board::restore(repo_url, db);

    match board.reload(source, db) {
        Ok(summary) => {
            db.set_last_repo_url(repo_url)?;
            println!(
                "Loaded {} issues from {}",
                summary.todo + summary.in_progress + summary.done,
                repo_url
            );
            println!("  ToDo:        {}", summary.todo);
            println!("  In Progress: {}", summary.in_progress);
            println!("  Done:        {}", summary.done);
            Ok(())
        }
        Err(LoadError::Fetch(e)) => {
            tracing::debug!("fetch error: {}", e);
            bail!("Failed to load issues")
        }
        Err(e) => bail!("{}", e),
    }
}
