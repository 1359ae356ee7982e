use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use ghkanban::config::{DATA_DIR_NAME, DB_FILE};
use ghkanban::db::Database;

pub fn run(path: &Path) -> Result<()> {
    let data_dir = path.join(DATA_DIR_NAME);

    if data_dir.exists() {
        println!("Already initialized at {}", path.display());
        return Ok(());
    }

    fs::create_dir_all(&data_dir).context("Failed to create .ghkanban directory")?;
    Database::open(&data_dir.join(DB_FILE))?;
    println!("Created {}", data_dir.display());

    println!("\nNext steps:");
    println!("  ghkanban load https://github.com/owner/repo   # Fetch issues");
    println!("  ghkanban                                      # Open the board");

    Ok(())
}
