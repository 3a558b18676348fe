// issuepress: read a blog published as labelled GitHub issues, in the terminal.
// Sets up configuration, logging, the runtime and the terminal, then runs the app.

mod app;
mod cache;
mod config;
mod data;
mod error;
mod github;
mod labels;
mod logging;
mod markdown;
mod paths;
mod router;
mod state;
mod ui;
mod views;

use std::io;
use std::panic;

use clap::Parser;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{error, info};

use crate::app::{App, AppContext};
use crate::config::Config;

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)
}

/// Log panics, and restore the terminal unless the panic is recovered by
/// an error boundary.
fn install_panic_hook() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        error!("panic: {}", panic_info);
        if views::inside_boundary() {
            return;
        }
        let _ = restore_terminal();
        default_hook(panic_info);
    }));
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();

    if let Some(path) = config.log_path() {
        if let Err(e) = logging::init(&path, &config.log_level) {
            eprintln!("Logging disabled: {}", e);
        }
    }
    info!(
        owner = %config.repo_owner,
        repo = %config.repo_name,
        endpoint = %config.endpoint,
        "starting issuepress"
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let context = AppContext::new(&config)?;

    install_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(context, &config);
    let result = runtime.block_on(app.run(&mut terminal));

    // Restore terminal
    restore_terminal()?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        error!("app exited with error: {}", e);
    }
    info!("exiting");
    result.map_err(Into::into)
}
