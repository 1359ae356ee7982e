use anyhow::Result;

use ghkanban::board::Board;
use ghkanban::db::Database;

/// Forget the saved board for `repo_url`, and the remembered repository when
/// it is the one being reset.
pub fn run(db: &Database, repo_url: &str) -> Result<()> {
    let mut board = Board::restore(repo_url, db);
    board.reset(db);
    if db.last_repo_url()?.as_deref() == Some(repo_url) {
        db.set_last_repo_url("")?;
    }
    println!("Board has been reset.");
    Ok(())
}
