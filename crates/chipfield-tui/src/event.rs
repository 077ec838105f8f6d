use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};

/// Events the picker reacts to.
#[derive(Debug)]
pub enum PickerEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    /// Poll timed out with nothing to do.
    Tick,
}

/// Polls for terminal events with a configurable tick rate.
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    /// Block until the next event (key press, resize, or tick timeout).
    pub fn next(&self) -> Result<PickerEvent> {
        if event::poll(self.tick_rate)? {
            match event::read()? {
                // Windows reports releases too; only presses edit the input.
                CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                    Ok(PickerEvent::Key(key))
                }
                CrosstermEvent::Resize(w, h) => Ok(PickerEvent::Resize(w, h)),
                _ => Ok(PickerEvent::Tick),
            }
        } else {
            Ok(PickerEvent::Tick)
        }
    }
}
