use anyhow::Result;
use kiwi_core::{Action, Config, GatewayClient};

mod app;
mod handler;
mod message;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[tokio::main]
async fn main() -> Result<()> {
    // Logging is best effort; the UI works without it
    if let Err(e) = kiwi_core::logging::init() {
        eprintln!("Warning: logging disabled: {}", e);
    }

    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config, using defaults: {:#}", e);
        Config::new()
    });
    let gateway = GatewayClient::new(&config.resolve_base_url());
    tracing::info!(base_url = gateway.base_url(), "gateway configured");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let mut app = App::new(gateway, events.sender());
    app.dispatch(Action::Mount);

    let result = run(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    tracing::info!("Kiwi exiting");
    result
}

async fn run(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }
    }
    Ok(())
}
