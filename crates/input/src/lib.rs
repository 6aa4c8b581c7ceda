//! Keyboard input via crossterm.
//!
//! [`CrosstermKeys`] is the production [`KeySource`]: it polls crossterm's
//! event stream, passes character presses through, and ignores everything
//! else (releases, repeats, resizes).

pub mod map;

use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEventKind};

use tui_wam_core::KeySource;

/// Reads keys from the terminal crossterm is attached to.
#[derive(Debug, Default)]
pub struct CrosstermKeys;

impl CrosstermKeys {
    pub fn new() -> Self {
        Self
    }
}

impl KeySource for CrosstermKeys {
    fn next_key(&self, max_wait_ms: i64) -> Option<char> {
        let deadline = Instant::now() + Duration::from_millis(max_wait_ms.max(0) as u64);
        loop {
            let timeout = deadline.saturating_duration_since(Instant::now());
            match event::poll(timeout) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                        if let KeyCode::Char(c) = key.code {
                            return Some(c);
                        }
                    }
                    // Resize, mouse, focus, key release: not our problem.
                    Ok(_) => {}
                    Err(_) => return None,
                },
                Ok(false) => return None,
                Err(_) => return None,
            }
            if Instant::now() >= deadline {
                return None;
            }
        }
    }

    fn next_key_blocking(&self) -> char {
        loop {
            if let Some(key) = self.next_key(1000) {
                return key;
            }
        }
    }
}
