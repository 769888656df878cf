use crate::api::{ApiClient, SearchBackend};
use crate::event::EventReader;
use crate::tui::App;
use anyhow::{Context, Result};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

const TICK_RATE: Duration = Duration::from_millis(100);

/// Load config, set up logging and the API client, then run the TUI
pub async fn run() -> Result<()> {
    let config = crate::config::load_or_create_config()?;
    let _log_guard = crate::logging::init(&config)?;

    let client = ApiClient::from_settings(&config.api);
    tracing::info!(
        base_url = %client.base_url(),
        timeout_ms = config.api.timeout_ms,
        "api client configured"
    );
    let backend: Arc<dyn SearchBackend> = Arc::new(client);

    let (width, _) = crossterm::terminal::size().context("Failed to read terminal size")?;
    let mut app = App::new(backend, width);

    let mut terminal = setup_terminal()?;
    let result = run_loop(&mut terminal, &mut app).await;
    restore_terminal(&mut terminal)?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "application exited with error");
    }
    result
}

async fn run_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    let mut events = EventReader::spawn(TICK_RATE);

    while !app.should_quit() {
        terminal
            .draw(|frame| app.render(frame))
            .context("Failed to draw frame")?;

        let Some(event) = events.next().await else {
            break;
        };
        app.handle_event(event)?;

        // Drain whatever else is queued before the next draw.
        while let Ok(event) = events.try_next() {
            app.handle_event(event)?;
        }
    }

    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    Terminal::new(CrosstermBackend::new(stdout)).context("Failed to create terminal")
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}
