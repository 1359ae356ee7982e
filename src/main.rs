mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::env;
use std::path::{Path, PathBuf};

use ghkanban::config::{self, DB_FILE, LOG_FILE};
use ghkanban::db::Database;
use ghkanban::github::{GithubClient, DEFAULT_API_URL};
use ghkanban::logging::{self, LogFormat};
use ghkanban::models::{Bucket, Theme};

#[derive(Parser)]
#[command(name = "ghkanban")]
#[command(about = "A kanban board for a GitHub repository's issues")]
#[command(version)]
struct Cli {
    /// GitHub token sent with API requests
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Base URL of the repository API
    #[arg(long, global = true, env = "GHKANBAN_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Data directory (defaults to the nearest .ghkanban above the current directory)
    #[arg(long, global = true, env = "GHKANBAN_DIR")]
    dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize ghkanban in the current directory
    Init,

    /// Fetch a repository's issues and save them as a fresh board
    Load {
        /// GitHub repository URL (defaults to the last one used)
        url: Option<String>,
    },

    /// Print the saved board
    Show {
        /// GitHub repository URL (defaults to the last one used)
        url: Option<String>,
        /// Only show one lane (todo, inProgress, done)
        #[arg(short, long)]
        bucket: Option<Bucket>,
    },

    /// Move an issue to a lane
    Move {
        /// Issue ID
        id: i64,
        /// Destination lane (todo, inProgress, done)
        #[arg(long)]
        to: Bucket,
        /// Place before this issue when reordering within a lane
        #[arg(long)]
        before: Option<i64>,
        /// GitHub repository URL (defaults to the last one used)
        #[arg(long)]
        url: Option<String>,
    },

    /// Delete the saved board and forget the repository
    Reset {
        /// GitHub repository URL (defaults to the last one used)
        url: Option<String>,
    },

    /// Show or set the color theme (light, dark)
    Theme { theme: Option<Theme> },

    /// Open the interactive board (default)
    Board {
        /// GitHub repository URL (defaults to the last one used)
        url: Option<String>,
    },
}

fn data_dir(cli_dir: Option<&Path>) -> Result<PathBuf> {
    let cwd = env::current_dir()?;
    config::resolve_data_dir(cli_dir, &cwd)
}

fn get_db(data_dir: &Path) -> Result<Database> {
    let db_path = data_dir.join(DB_FILE);
    Database::open(&db_path).context("Failed to open database")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Board { url: None });

    match command {
        Commands::Init => {
            logging::init(cli.verbose, cli.log_format);
            let cwd = env::current_dir()?;
            commands::init::run(&cwd)
        }

        Commands::Board { url } => {
            let dir = data_dir(cli.dir.as_deref())?;
            // stderr is owned by the terminal UI
            logging::init_file(cli.verbose, cli.log_format, &dir.join(LOG_FILE))?;
            let db = get_db(&dir)?;
            let client = GithubClient::new(&cli.api_url, cli.token);
            ghkanban::tui::run(&db, &client, url)
        }

        Commands::Load { url } => {
            logging::init(cli.verbose, cli.log_format);
            let db = get_db(&data_dir(cli.dir.as_deref())?)?;
            let url = commands::resolve_url(&db, url.as_deref())?;
            let client = GithubClient::new(&cli.api_url, cli.token);
            commands::load::run(&db, &client, &url)
        }

        Commands::Show { url, bucket } => {
            logging::init(cli.verbose, cli.log_format);
            let db = get_db(&data_dir(cli.dir.as_deref())?)?;
            let url = commands::resolve_url(&db, url.as_deref())?;
            commands::show::run(&db, &url, bucket)
        }

        Commands::Move {
            id,
            to,
            before,
            url,
        } => {
            logging::init(cli.verbose, cli.log_format);
            let db = get_db(&data_dir(cli.dir.as_deref())?)?;
            let url = commands::resolve_url(&db, url.as_deref())?;
            commands::move_issue::run(&db, &url, id, to, before)
        }

        Commands::Reset { url } => {
            logging::init(cli.verbose, cli.log_format);
            let db = get_db(&data_dir(cli.dir.as_deref())?)?;
            let url = commands::resolve_url(&db, url.as_deref())?;
            commands::reset::run(&db, &url)
        }

        Commands::Theme { theme } => {
            logging::init(cli.verbose, cli.log_format);
            let db = get_db(&data_dir(cli.dir.as_deref())?)?;
            commands::theme::run(&db, theme)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_command_is_board() {
        let cli = Cli::try_parse_from(["ghkanban"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.log_format, LogFormat::Text);
    }

    #[test]
    fn test_move_parses_bucket() {
        let cli =
            Cli::try_parse_from(["ghkanban", "move", "7", "--to", "inProgress", "--before", "3"])
                .unwrap();
        match cli.command {
            Some(Commands::Move { id, to, before, .. }) => {
                assert_eq!(id, 7);
                assert_eq!(to, Bucket::InProgress);
                assert_eq!(before, Some(3));
            }
            _ => panic!("expected move"),
        }
    }

    #[test]
    fn test_invalid_bucket_rejected() {
        assert!(Cli::try_parse_from(["ghkanban", "move", "7", "--to", "later"]).is_err());
        assert!(Cli::try_parse_from(["ghkanban", "theme", "blue"]).is_err());
    }
}
