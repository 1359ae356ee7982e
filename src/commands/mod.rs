pub mod init;
pub mod load;
pub mod move_issue;
pub mod reset;
pub mod show;
pub mod theme;

use anyhow::{bail, Result};

use ghkanban::db::Database;

/// Repository named on the command line, or the one used last.
pub fn resolve_url(db: &Database, url: Option<&str>) -> Result<String> {
    if let Some(url) = url {
        return Ok(url.to_string());
    }
    match db.last_repo_url()? {
        Some(url) => Ok(url),
        None => bail!("No repository given and none used before. Pass a GitHub repo URL."),
    }
}
