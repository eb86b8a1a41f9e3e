use std::fs::{self, File};
use std::sync::Mutex;

use anyhow::Result;
use forge_core::Config;
use tracing_subscriber::EnvFilter;

mod actions;
mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    init_logging(&config);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let result = run(&mut terminal, config).await;

    tui::restore()?;
    result
}

async fn run(terminal: &mut tui::Tui, config: Config) -> Result<()> {
    let mut events = EventHandler::new();
    let mut app = App::new(config, events.sender());
    tracing::info!(server = %app.client.base_url(), source = ?app.config.model_source, "starting Nebula Forge");
    app.start_probe();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(&mut app, event),
            None => break,
        }
    }

    tracing::info!("exiting");
    Ok(())
}

/// Log to a file under the cache dir; stderr is owned by the terminal UI.
fn init_logging(config: &Config) {
    let Some(log_dir) = dirs::cache_dir().map(|dir| dir.join("nebula-forge")) else {
        return;
    };
    if fs::create_dir_all(&log_dir).is_err() {
        return;
    }
    let Ok(file) = File::create(log_dir.join("nebula-forge.log")) else {
        return;
    };

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}
