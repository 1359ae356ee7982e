//! Interactive terminal board.

pub mod app;
pub mod event;
pub mod hooks;
pub mod ui;

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::db::Database;
use crate::github::IssueSource;
use app::App;
use event::{AppEvent, EventHandler};

type Term = Terminal<CrosstermBackend<Stdout>>;

fn setup_terminal() -> Result<Term> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    Terminal::new(CrosstermBackend::new(stdout)).context("Failed to create terminal")
}

fn restore_terminal(terminal: &mut Term) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the board until the user quits or the process is asked to stop.
pub fn run(db: &Database, source: &dyn IssueSource, repo_url: Option<String>) -> Result<()> {
    let term_signal = Arc::new(AtomicBool::new(false));
    for sig in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
        signal_hook::flag::register(sig, Arc::clone(&term_signal))
            .context("Failed to register signal handler")?;
    }

    let mut app = App::new(db, source, repo_url);
    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, &mut app, &term_signal);
    restore_terminal(&mut terminal)?;
    result
}

fn event_loop(terminal: &mut Term, app: &mut App, term_signal: &AtomicBool) -> Result<()> {
    let events = EventHandler::new(Duration::from_millis(250));
    app.resize(terminal.size()?.width);

    while !app.should_quit {
        if term_signal.load(Ordering::Relaxed) {
            tracing::info!("shutdown requested");
            break;
        }

        terminal.draw(|frame| ui::render(frame, app))?;

        // The pending frame is on screen; now block on the fetch.
        if app.loading {
            app.run_pending_load();
            continue;
        }

        match events.next()? {
            AppEvent::Key(key) => app.handle_key(key),
            AppEvent::Mouse(mouse) => app.handle_mouse(mouse),
            AppEvent::Resize(width, _) => app.resize(width),
            AppEvent::Tick => {}
        }
    }
    Ok(())
}
