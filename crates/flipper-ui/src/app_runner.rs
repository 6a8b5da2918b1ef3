//! Cooperative single-slot app runner.
//!
//! At most one app occupies the slot. The host loop polls it once per
//! iteration; an app that reports [`AppState::Exit`] is stopped and the menu
//! is flagged for redraw.

/// Result of one app frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Running,
    Exit,
}

/// A foreground application driven by the host loop.
pub trait App {
    /// Process one frame: read input, update state, redraw if needed.
    fn poll(&mut self) -> AppState;
}

impl<F> App for F
where
    F: FnMut() -> AppState,
{
    fn poll(&mut self) -> AppState {
        self()
    }
}

/// Owns the foreground app slot.
#[derive(Default)]
pub struct AppRunner {
    current: Option<Box<dyn App>>,
    running: bool,
    menu_invalidated: bool,
}

impl AppRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Occupy the slot with `app`, replacing any previous occupant.
    pub fn start_app<A: App + 'static>(&mut self, app: A) {
        self.start_boxed(Box::new(app));
    }

    pub fn start_boxed(&mut self, app: Box<dyn App>) {
        if self.current.is_some() {
            log::debug!("Replacing running app");
        }
        self.current = Some(app);
        self.running = true;
    }

    /// Clear the slot and flag the menu for redraw.
    pub fn stop_app(&mut self) {
        self.current = None;
        self.running = false;
        self.menu_invalidated = true;
    }

    pub fn is_app_running(&self) -> bool {
        self.running
    }

    /// Poll the current app once. Returns whether an app is still running.
    pub fn run_app_frame(&mut self) -> bool {
        if !self.running {
            return false;
        }
        let Some(app) = self.current.as_mut() else {
            return false;
        };
        match app.poll() {
            AppState::Running => true,
            AppState::Exit => {
                self.stop_app();
                false
            }
        }
    }

    /// Consume the "menu needs redraw" flag raised by [`AppRunner::stop_app`].
    pub fn take_menu_invalidation(&mut self) -> bool {
        core::mem::take(&mut self.menu_invalidated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn app_runs_until_it_exits() {
        let polls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&polls);
        let mut runner = AppRunner::new();
        runner.start_app(move || {
            counter.set(counter.get() + 1);
            if counter.get() == 2 {
                AppState::Exit
            } else {
                AppState::Running
            }
        });

        assert!(runner.is_app_running());
        assert!(runner.run_app_frame());
        assert!(runner.is_app_running());
        assert!(!runner.run_app_frame());
        assert!(!runner.is_app_running());
        assert_eq!(polls.get(), 2);
        assert!(runner.take_menu_invalidation());
        assert!(!runner.take_menu_invalidation());
    }

    #[test]
    fn starting_replaces_previous_occupant() {
        let first = Rc::new(Cell::new(0));
        let second = Rc::new(Cell::new(0));
        let mut runner = AppRunner::new();

        let a = Rc::clone(&first);
        runner.start_app(move || {
            a.set(a.get() + 1);
            AppState::Running
        });
        let b = Rc::clone(&second);
        runner.start_app(move || {
            b.set(b.get() + 1);
            AppState::Running
        });

        assert!(runner.run_app_frame());
        assert_eq!(first.get(), 0);
        assert_eq!(second.get(), 1);
        // Dropping the replaced app is the only cleanup; nothing redraws.
        assert_eq!(Rc::strong_count(&first), 1);
        assert!(!runner.take_menu_invalidation());

        runner.stop_app();
        assert!(!runner.is_app_running());
        assert!(runner.take_menu_invalidation());
    }

    #[test]
    fn idle_frame_is_noop() {
        let mut runner = AppRunner::new();
        assert!(!runner.is_app_running());
        assert!(!runner.run_app_frame());
        assert!(!runner.take_menu_invalidation());
    }

    struct Countdown(u8);

    impl App for Countdown {
        fn poll(&mut self) -> AppState {
            match self.0.checked_sub(1) {
                Some(left) => {
                    self.0 = left;
                    AppState::Running
                }
                None => AppState::Exit,
            }
        }
    }

    #[test]
    fn trait_apps_run_through_boxed_slot() {
        let mut runner = AppRunner::new();
        runner.start_boxed(Box::new(Countdown(2)));
        assert!(runner.run_app_frame());
        assert!(runner.run_app_frame());
        assert!(!runner.run_app_frame());
        assert!(!runner.run_app_frame());
    }
}
