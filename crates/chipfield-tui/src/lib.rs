pub mod app;
pub mod dropdown;
pub mod event;
pub mod keys;
pub mod ui;

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use app::{App, Outcome};
use event::{EventHandler, PickerEvent};

/// Run the interactive picker until the user submits or cancels.
pub fn run_tui(app: &mut App) -> Result<Outcome> {
    // Install panic hook
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = std::io::stdout().execute(crossterm::terminal::LeaveAlternateScreen);
        original_hook(info);
    }));

    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let event_handler = EventHandler::new(Duration::from_millis(app.ui.tick_rate_ms.max(10)));

    let result = event_loop(&mut terminal, &event_handler, app);

    // Restore terminal even when the loop failed
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    result?;

    Ok(app.outcome.clone().unwrap_or(Outcome::Cancelled))
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    events: &EventHandler,
    app: &mut App,
) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(frame, app))?;

        match events.next()? {
            PickerEvent::Key(key) => keys::handle_key(app, key.code, key.modifiers),
            PickerEvent::Resize(_, _) | PickerEvent::Tick => {}
        }
    }
    Ok(())
}
