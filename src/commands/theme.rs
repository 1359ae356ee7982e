use anyhow::Result;

use ghkanban::db::Database;
use ghkanban::models::Theme;

/// Show the saved theme, or save a new one.
pub fn run(db: &Database, theme: Option<Theme>) -> Result<()> {
    match theme {
        Some(theme) => {
            db.set_theme(theme)?;
            println!("Theme set to {}", theme.as_str());
        }
        None => println!("{}", db.theme()?.as_str()),
    }
    Ok(())
}
