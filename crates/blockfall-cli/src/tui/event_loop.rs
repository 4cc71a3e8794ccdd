use std::time::Instant;

use crossterm::event::{self, Event};

/// Events handed to the play loop.
#[derive(Debug, Clone)]
pub enum TuiEvent {
    /// The deadline passed without input.
    Tick,
    /// The screen is out of date.
    Render,
    /// Terminal events such as key input and resize.
    Crossterm(Event),
}

/// Event loop driven by the engine's next deadline instead of a fixed tick rate.
///
/// Between renders the loop wakes on a crossterm event or on the deadline given
/// to [`next`](Self::next). Every event marks the screen dirty, so a render
/// follows each of them.
#[derive(Debug)]
pub struct EventLoop {
    dirty: bool,
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLoop {
    pub fn new() -> Self {
        Self {
            dirty: true, // Initial render is required on startup
        }
    }

    /// Returns the next event.
    ///
    /// Blocks until `deadline` is reached or a crossterm event occurs. Without a
    /// deadline, only waits for crossterm events.
    pub fn next(&mut self, deadline: Option<Instant>) -> anyhow::Result<TuiEvent> {
        if self.dirty {
            self.dirty = false;
            return Ok(TuiEvent::Render);
        }

        self.dirty = true;
        if let Some(deadline) = deadline {
            let timeout = deadline.saturating_duration_since(Instant::now());
            if !event::poll(timeout)? {
                return Ok(TuiEvent::Tick);
            }
        }
        Ok(TuiEvent::Crossterm(event::read()?))
    }
}
