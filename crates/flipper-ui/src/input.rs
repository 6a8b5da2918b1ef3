//! Joystick input abstraction.
//!
//! An analog two-axis joystick with a push button. Each direction fires once
//! when its axis leaves the centre band and re-arms only after the axis
//! returns to the centre.

use std::sync::Arc;

use parking_lot::Mutex;

/// ADC reading below which an axis counts as deflected low.
pub const JOYSTICK_LOW_THRESHOLD: u16 = 1000;
/// ADC reading above which an axis counts as deflected high.
pub const JOYSTICK_HIGH_THRESHOLD: u16 = 3000;

/// One raw reading of the joystick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoystickSample {
    pub x: u16,
    pub y: u16,
    pub button_down: bool,
}

impl JoystickSample {
    /// Both axes at rest (12-bit ADC midpoint), button up.
    pub const CENTERED: Self = Self {
        x: 2048,
        y: 2048,
        button_down: false,
    };
}

impl Default for JoystickSample {
    fn default() -> Self {
        Self::CENTERED
    }
}

/// Hardware (or scripted) source of joystick samples.
pub trait JoystickSource {
    fn sample(&mut self) -> JoystickSample;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoystickConfig {
    pub low: u16,
    pub high: u16,
    /// Swap left and right.
    pub invert_x: bool,
    /// Swap up and down.
    pub invert_y: bool,
}

impl Default for JoystickConfig {
    fn default() -> Self {
        Self {
            low: JOYSTICK_LOW_THRESHOLD,
            high: JOYSTICK_HIGH_THRESHOLD,
            invert_x: false,
            invert_y: false,
        }
    }
}

/// Edge-triggered controls for one update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// The button went from held to released on this update.
    pub button_released: bool,
    /// Level: the button is currently held.
    pub button_held: bool,
}

#[derive(Debug, Clone, Copy, Default)]
struct AxisLatch {
    low: bool,
    high: bool,
}

impl AxisLatch {
    fn primed(value: u16, config: &JoystickConfig) -> Self {
        Self {
            low: value < config.low,
            high: value > config.high,
        }
    }

    /// Returns `(low_fired, high_fired)`.
    fn update(&mut self, value: u16, config: &JoystickConfig) -> (bool, bool) {
        let centred = value >= config.low && value <= config.high;
        let mut fired = (false, false);

        if value < config.low && !self.low {
            self.low = true;
            fired.0 = true;
        } else if centred {
            self.low = false;
        }

        if value > config.high && !self.high {
            self.high = true;
            fired.1 = true;
        } else if centred {
            self.high = false;
        }

        fired
    }
}

/// Joystick state machine turning raw samples into [`ControlState`].
pub struct Controls<S> {
    source: S,
    config: JoystickConfig,
    x: AxisLatch,
    y: AxisLatch,
    button_was_down: bool,
}

impl<S: JoystickSource> Controls<S> {
    /// Read the resting position and prime the latches from it, so a stick
    /// that is already deflected at boot does not fire.
    pub fn new(mut source: S, config: JoystickConfig) -> Self {
        let rest = source.sample();
        log::info!("Joystick center values - X: {}, Y: {}", rest.x, rest.y);
        Self {
            x: AxisLatch::primed(rest.x, &config),
            y: AxisLatch::primed(rest.y, &config),
            source,
            config,
            button_was_down: false,
        }
    }

    /// Take one sample and compute this update's edges.
    pub fn update(&mut self) -> ControlState {
        let sample = self.source.sample();
        let (y_low, y_high) = self.y.update(sample.y, &self.config);
        let (x_low, x_high) = self.x.update(sample.x, &self.config);

        // Stick forward reads high on Y, stick left reads high on X.
        let (up, down) = if self.config.invert_y {
            (y_low, y_high)
        } else {
            (y_high, y_low)
        };
        let (left, right) = if self.config.invert_x {
            (x_low, x_high)
        } else {
            (x_high, x_low)
        };

        let state = ControlState {
            up,
            down,
            left,
            right,
            button_released: self.button_was_down && !sample.button_down,
            button_held: sample.button_down,
        };
        self.button_was_down = sample.button_down;
        state
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

/// Shared view of the latest [`ControlState`] for apps.
#[derive(Debug, Clone, Default)]
pub struct InputHandle(Arc<Mutex<ControlState>>);

impl InputHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, state: ControlState) {
        *self.0.lock() = state;
    }

    pub fn current(&self) -> ControlState {
        *self.0.lock()
    }

    /// Clear the release edge after an app has acted on it.
    pub fn consume_button_release(&self) {
        self.0.lock().button_released = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct Script(VecDeque<JoystickSample>);

    impl Script {
        fn new(samples: &[(u16, u16, bool)]) -> Self {
            Self(
                samples
                    .iter()
                    .map(|&(x, y, button_down)| JoystickSample { x, y, button_down })
                    .collect(),
            )
        }
    }

    impl JoystickSource for Script {
        fn sample(&mut self) -> JoystickSample {
            self.0.pop_front().unwrap_or(JoystickSample::CENTERED)
        }
    }

    const C: u16 = 2048;

    #[test]
    fn held_deflection_fires_once() {
        let mut controls = Controls::new(
            Script::new(&[(C, C, false), (C, 3500, false), (C, 3600, false), (C, C, false), (C, 3500, false)]),
            JoystickConfig::default(),
        );
        assert!(controls.update().up);
        assert!(!controls.update().up);
        assert_eq!(controls.update(), ControlState::default());
        assert!(controls.update().up);
    }

    #[test]
    fn directions_follow_axes() {
        let mut controls = Controls::new(
            Script::new(&[(C, C, false), (C, 500, false), (C, C, false), (3500, C, false), (C, C, false), (500, C, false)]),
            JoystickConfig::default(),
        );
        assert!(controls.update().down);
        controls.update();
        assert!(controls.update().left);
        controls.update();
        let state = controls.update();
        assert!(state.right);
        assert!(!state.left && !state.up && !state.down);
    }

    #[test]
    fn inversion_swaps_directions() {
        let config = JoystickConfig {
            invert_x: true,
            invert_y: true,
            ..JoystickConfig::default()
        };
        let mut controls = Controls::new(
            Script::new(&[(C, C, false), (C, 500, false), (C, C, false), (500, C, false)]),
            config,
        );
        assert!(controls.update().up);
        controls.update();
        assert!(controls.update().left);
    }

    #[test]
    fn deflected_at_boot_does_not_fire_until_recentred() {
        let mut controls = Controls::new(
            Script::new(&[(C, 3500, false), (C, 3500, false), (C, C, false), (C, 3500, false)]),
            JoystickConfig::default(),
        );
        assert!(!controls.update().up);
        assert!(!controls.update().up);
        assert!(controls.update().up);
    }

    #[test]
    fn crossing_directly_to_opposite_side_fires() {
        let mut controls = Controls::new(
            Script::new(&[(C, C, false), (C, 3500, false), (C, 500, false)]),
            JoystickConfig::default(),
        );
        assert!(controls.update().up);
        assert!(controls.update().down);
    }

    #[test]
    fn release_edge_fires_after_hold() {
        let mut controls = Controls::new(
            Script::new(&[(C, C, false), (C, C, true), (C, C, true), (C, C, false), (C, C, false)]),
            JoystickConfig::default(),
        );
        let held = controls.update();
        assert!(held.button_held && !held.button_released);
        assert!(!controls.update().button_released);
        let released = controls.update();
        assert!(released.button_released && !released.button_held);
        assert!(!controls.update().button_released);
    }

    #[test]
    fn consumed_release_is_cleared() {
        let handle = InputHandle::new();
        handle.publish(ControlState {
            button_released: true,
            ..ControlState::default()
        });
        let shared = handle.clone();
        shared.consume_button_release();
        assert!(!handle.current().button_released);
    }
}
