//! Quiet-interval gate for the secondary (e-paper) panel in dual mode.
//!
//! Menu input redraws the OLED immediately. The e-paper follows only once
//! input has been quiet for [`EPAPER_DEBOUNCE_MS`], and never while a
//! previous redraw is still in flight.

use std::time::{Duration, Instant};

pub const EPAPER_DEBOUNCE_MS: u64 = 500;

#[derive(Debug, Clone)]
pub struct SecondaryDebounce {
    needs_update: bool,
    is_updating: bool,
    last_input: Option<Instant>,
    window: Duration,
}

impl Default for SecondaryDebounce {
    fn default() -> Self {
        Self::new(Duration::from_millis(EPAPER_DEBOUNCE_MS))
    }
}

impl SecondaryDebounce {
    pub fn new(window: Duration) -> Self {
        Self {
            needs_update: false,
            is_updating: false,
            last_input: None,
            window,
        }
    }

    /// Record qualifying input at `now`. Restarts the quiet interval.
    pub fn note_input(&mut self, now: Instant) {
        self.needs_update = true;
        self.last_input = Some(now);
    }

    /// Whether the secondary panel should be redrawn at `now`.
    pub fn due(&self, now: Instant) -> bool {
        if !self.needs_update || self.is_updating {
            return false;
        }
        match self.last_input {
            Some(last) => now.saturating_duration_since(last) >= self.window,
            None => false,
        }
    }

    pub fn begin(&mut self) {
        self.needs_update = false;
        self.is_updating = true;
    }

    pub fn finish(&mut self) {
        self.is_updating = false;
    }

    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    pub fn is_updating(&self) -> bool {
        self.is_updating
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn fires_once_after_quiet_window() {
        let t0 = Instant::now();
        let mut debounce = SecondaryDebounce::default();
        assert!(!debounce.due(t0 + ms(10_000)));

        debounce.note_input(t0);
        assert!(!debounce.due(t0 + ms(499)));
        assert!(debounce.due(t0 + ms(500)));

        debounce.begin();
        assert!(!debounce.needs_update());
        assert!(!debounce.due(t0 + ms(600)));
        debounce.finish();
        assert!(!debounce.due(t0 + ms(2_000)));
    }

    #[test]
    fn new_input_restarts_window() {
        let t0 = Instant::now();
        let mut debounce = SecondaryDebounce::default();
        debounce.note_input(t0);
        debounce.note_input(t0 + ms(400));
        assert!(!debounce.due(t0 + ms(600)));
        assert!(debounce.due(t0 + ms(900)));
    }

    #[test]
    fn never_due_while_redraw_in_flight() {
        let t0 = Instant::now();
        let mut debounce = SecondaryDebounce::new(ms(100));
        debounce.note_input(t0);
        debounce.begin();
        assert!(debounce.is_updating());

        // Input during the redraw queues another one for after it finishes.
        debounce.note_input(t0 + ms(50));
        assert!(!debounce.due(t0 + ms(500)));
        debounce.finish();
        assert!(debounce.due(t0 + ms(500)));
    }
}
