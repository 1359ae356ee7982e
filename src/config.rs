use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

pub const DATA_DIR_NAME: &str = ".ghkanban";
pub const DB_FILE: &str = "board.db";
pub const LOG_FILE: &str = "ghkanban.log";

/// Nearest `.ghkanban` directory at or above `start`.
pub fn find_data_dir(start: &Path) -> Result<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let candidate = current.join(DATA_DIR_NAME);
        if candidate.is_dir() {
            return Ok(candidate);
        }

        if !current.pop() {
            bail!("Not a ghkanban directory (or any parent). Run 'ghkanban init' first.");
        }
    }
}

/// Explicit directory if given, otherwise the nearest one above `cwd`.
pub fn resolve_data_dir(explicit: Option<&Path>, cwd: &Path) -> Result<PathBuf> {
    match explicit {
        Some(dir) => {
            if !dir.is_dir() {
                bail!("Data directory {} does not exist", dir.display());
            }
            Ok(dir.to_path_buf())
        }
        None => find_data_dir(cwd),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_find_in_current_dir() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(DATA_DIR_NAME)).unwrap();
        let found = find_data_dir(dir.path()).unwrap();
        assert_eq!(found, dir.path().join(DATA_DIR_NAME));
    }

    #[test]
    fn test_find_in_parent_dir() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(DATA_DIR_NAME)).unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(find_data_dir(&nested).unwrap(), dir.path().join(DATA_DIR_NAME));
    }

    #[test]
    fn test_plain_file_is_not_a_data_dir() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("inner");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join(DATA_DIR_NAME), "").unwrap();
        // Either an ancestor of the temp dir has one, or nothing does.
        if let Ok(found) = find_data_dir(&nested) {
            assert_ne!(found, nested.join(DATA_DIR_NAME));
        }
    }

    #[test]
    fn test_explicit_dir_must_exist() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = resolve_data_dir(Some(&missing), dir.path()).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
        assert_eq!(
            resolve_data_dir(Some(dir.path()), Path::new("/")).unwrap(),
            dir.path()
        );
    }
}
