use std::io;

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{error, info};

use world_explorer::Result;
use world_explorer::config::Config;
use world_explorer::{app, logging};

fn main() -> Result<()> {
    let config = Config::load();
    let _guard = logging::init_logging(&config.log_dir)?;
    info!(api_url = %config.api_url, data_dir = %config.data_dir.display(), "starting");

    // Raw mode lets us read keys directly without line buffering.
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    // Switch to an alternate screen so we can draw a TUI.
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app::run_app(&mut terminal, &config);

    // Always restore the terminal to a clean state.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        error!(error = %err, "exiting with error");
    }
    result
}
