//! Keystroke input handling using crossterm
//!
//! Features:
//! - Bounded key wait with a deadline
//! - Keys pressed before a prompt are discarded
//! - Ctrl+C and Escape both quit

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::io::Result as IoResult;
use std::time::{Duration, Instant};

use crate::error::BartResult;
use crate::session::{InputSource, Key};

/// Handles participant input from the terminal
pub struct InputHandler {
    /// Longest single poll while waiting for a deadline
    poll_timeout: Duration,
}

impl InputHandler {
    /// Create new input handler with default timeout (50ms for responsive input)
    pub fn new() -> Self {
        InputHandler {
            poll_timeout: Duration::from_millis(50),
        }
    }

    /// Discard everything already queued
    fn drain_pending(&self) -> IoResult<()> {
        while event::poll(Duration::ZERO)? {
            event::read()?;
        }
        Ok(())
    }

    /// Check if key event is an exit signal (Ctrl+C or Escape)
    pub fn is_exit(key: &KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => true,
            KeyCode::Esc => true,
            _ => false,
        }
    }

    /// Map a key event to a task response
    pub fn map_key(key: &KeyEvent) -> Option<Key> {
        if Self::is_exit(key) {
            return Some(Key::Quit);
        }
        match key.code {
            KeyCode::Char(' ') => Some(Key::Pump),
            KeyCode::Enter => Some(Key::CashOut),
            _ => None,
        }
    }
}

impl InputSource for InputHandler {
    fn wait_for_key(&mut self, allowed: &[Key], max_wait: Duration) -> BartResult<Option<Key>> {
        self.drain_pending()?;
        let deadline = Instant::now() + max_wait;

        loop {
            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }

            let slice = (deadline - now).min(self.poll_timeout);
            if !event::poll(slice)? {
                continue;
            }
            // Ignore repeats/releases and anything not asked for; the deadline stands
            if let Event::Key(key_event) = event::read()? {
                if key_event.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(key) = Self::map_key(&key_event) {
                    if allowed.contains(&key) {
                        return Ok(Some(key));
                    }
                }
            }
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}
