//! TUI (Terminal User Interface) module for Tabula.
//!
//! Renders the start-page dashboard (greeting, clock, weather, commands,
//! quick-link tiles) with a pop-over search bar driven by the core
//! resolve-and-suggest pipeline.

pub mod app;
pub mod event;
pub mod theme;

use app::App;
use std::sync::Arc;
use tabula_core::{CommandRegistry, SuggestionEngine, TabulaConfig};

/// Run the TUI application.
pub async fn run(
    config: Arc<TabulaConfig>,
    registry: Arc<CommandRegistry>,
    engine: Arc<SuggestionEngine>,
) -> anyhow::Result<()> {
    // Setup terminal
    crossterm::terminal::enable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::EnterAlternateScreen)?;

    let backend = ratatui::backend::CrosstermBackend::new(std::io::stdout());
    let mut terminal = ratatui::Terminal::new(backend)?;
    terminal.clear()?;

    // Run app
    let mut app = App::new(config, registry, engine);
    let result = app.run(&mut terminal).await;

    // Restore terminal
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}
