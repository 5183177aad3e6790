use std::io;
use std::time::Duration;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use miette::IntoDiagnostic;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use wearai::config::AppConfig;
use wearai::core::assets::AssetLoader;
use wearai::core::logging::{self, StartupError};
use wearai::core::wizard::Session;
use wearai::tui::app::AppState;
use wearai::tui::services::Services;

#[tokio::main]
async fn main() -> miette::Result<()> {
    let config = AppConfig::load();

    // Initialize logging
    let _log_guard = logging::init_tui(&config.log_dir());
    log::info!("WearAI v{} starting", wearai::VERSION);

    let tick_rate = Duration::from_millis(config.tui.tick_rate_ms);
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let services = Services::init(config.clone(), event_tx.clone())
        .await
        .map_err(|e| {
            StartupError::new(format!("Failed to initialize services: {e}"))
                .with_help("Check your network and TLS configuration")
        })?;

    let mut session = Session::new(AssetLoader::preset_store(), config.wizard.clone());
    session.set_credential_valid(services.is_connected());

    let mut app = AppState::new(event_rx, event_tx, services, session);

    // Setup terminal
    enable_raw_mode().into_diagnostic()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).into_diagnostic()?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).into_diagnostic()?;

    let result = app.run(&mut terminal, tick_rate).await;

    // Restore terminal
    disable_raw_mode().into_diagnostic()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen).into_diagnostic()?;
    terminal.show_cursor().into_diagnostic()?;

    log::info!("WearAI shutting down");
    result.map_err(|e| StartupError::new(format!("Terminal error: {e}")))?;
    Ok(())
}
