//! Host-side scenario test harness for scripted UI flows.
//!
//! A [`ScenarioHarness`] drives a real [`Shell`] on [`TestPanel`]s with a
//! scripted joystick and a virtual clock, so flows run exactly like the
//! device main loop without hardware.

use std::collections::VecDeque;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use embedded_graphics::pixelcolor::BinaryColor;
use png::{BitDepth, ColorType, Encoder};

use flipper_ui::filesystem::shared;
use flipper_ui::mock_filesystem::MockFileSystem;
use flipper_ui::test_panel::TestPanel;
use flipper_ui::{
    Controls, JoystickConfig, JoystickSample, JoystickSource, RenderConfig, RenderQueue, Shell,
};

/// Main loop period on the device.
pub const TICK: Duration = Duration::from_millis(10);

const HIGH: u16 = 4000;
const LOW: u16 = 100;

/// Joystick directions the harness can push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stick {
    Up,
    Down,
    Left,
    Right,
}

/// Joystick that replays queued samples, then rests centred.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    samples: VecDeque<JoystickSample>,
}

impl ScriptedInput {
    pub fn push(&mut self, sample: JoystickSample) {
        self.samples.push_back(sample);
    }

    pub fn remaining(&self) -> usize {
        self.samples.len()
    }
}

impl JoystickSource for ScriptedInput {
    fn sample(&mut self) -> JoystickSample {
        self.samples.pop_front().unwrap_or(JoystickSample::CENTERED)
    }
}

fn deflected(stick: Stick) -> JoystickSample {
    let (x, y) = match stick {
        Stick::Up => (2048, HIGH),
        Stick::Down => (2048, LOW),
        Stick::Left => (HIGH, 2048),
        Stick::Right => (LOW, 2048),
    };
    JoystickSample {
        x,
        y,
        button_down: false,
    }
}

/// Couples a shell, mock filesystem and test panels for scenario tests.
pub struct ScenarioHarness {
    shell: Shell<TestPanel, ScriptedInput>,
    now: Instant,
}

impl ScenarioHarness {
    /// OLED-sized primary panel, synchronous flushing, sample filesystem.
    pub fn new() -> Self {
        Self::with_fs(MockFileSystem::sample())
    }

    pub fn with_fs(fs: MockFileSystem) -> Self {
        let config = RenderConfig {
            queue_depth: 0,
            ..RenderConfig::default()
        };
        Self::with_panel(TestPanel::oled(), config, fs)
    }

    /// Caller-provided primary panel and render configuration.
    pub fn with_panel(panel: TestPanel, config: RenderConfig, fs: MockFileSystem) -> Self {
        let render = Arc::new(RenderQueue::new(panel, config));
        let controls = Controls::new(ScriptedInput::default(), JoystickConfig::default());
        Self {
            shell: Shell::new(render, controls, shared(fs)),
            now: Instant::now(),
        }
    }

    /// OLED primary plus a debounced e-paper secondary.
    pub fn dual() -> Self {
        let mut harness = Self::new();
        harness.shell = harness.shell.with_secondary(TestPanel::epaper());
        harness
    }

    /// Draw the first frame, as at power-on.
    pub fn boot(&mut self) {
        self.shell.boot();
    }

    /// One main-loop iteration; the virtual clock advances by [`TICK`].
    pub fn tick(&mut self) {
        self.shell.tick(self.now);
        self.now += TICK;
    }

    /// Tick until the scripted input is consumed.
    pub fn run_script(&mut self) {
        while self.shell_input_remaining() > 0 {
            self.tick();
        }
    }

    /// Tick for `duration` of virtual time with the stick at rest.
    pub fn advance(&mut self, duration: Duration) {
        let end = self.now + duration;
        while self.now < end {
            self.tick();
        }
    }

    /// Deflect and release the stick, then let the loop see both samples.
    pub fn press(&mut self, stick: Stick) {
        let input = self.shell.controls_mut().source_mut();
        input.push(deflected(stick));
        input.push(JoystickSample::CENTERED);
        self.run_script();
    }

    /// Press and release the joystick button.
    pub fn click(&mut self) {
        let input = self.shell.controls_mut().source_mut();
        input.push(JoystickSample {
            button_down: true,
            ..JoystickSample::CENTERED
        });
        input.push(JoystickSample::CENTERED);
        self.run_script();
    }

    /// Hold the button down for `ticks` loop iterations without releasing.
    pub fn hold_button(&mut self, ticks: usize) {
        let held = JoystickSample {
            button_down: true,
            ..JoystickSample::CENTERED
        };
        for _ in 0..ticks {
            self.shell.controls_mut().source_mut().push(held);
        }
        self.run_script();
    }

    /// Block until the render worker has nothing queued or in flight.
    pub fn wait_for_render(&self, timeout: Duration) -> bool {
        let render = self.shell.render_queue();
        let start = Instant::now();
        while start.elapsed() < timeout {
            if !render.is_render_pending() && !render.is_render_busy() {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        false
    }

    fn shell_input_remaining(&mut self) -> usize {
        self.shell.controls_mut().source_mut().remaining()
    }

    /// Access the shell for assertions.
    pub fn shell(&self) -> &Shell<TestPanel, ScriptedInput> {
        &self.shell
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    /// Run `f` on the primary panel under the display lock.
    pub fn with_primary<R>(&self, f: impl FnOnce(&mut TestPanel) -> R) -> R {
        self.shell.render_queue().lock().with(f)
    }

    pub fn primary_flushes(&self) -> usize {
        self.with_primary(|panel| panel.flush_count())
    }

    pub fn secondary_flushes(&self) -> usize {
        self.shell.secondary().map_or(0, |panel| panel.flush_count())
    }

    /// Save the last flushed primary frame to a PNG (white = On).
    pub fn save_screenshot_png(&self, path: impl AsRef<Path>) -> Result<(), String> {
        let (width, height, data) = self.with_primary(|panel| {
            let (width, height) = panel.dimensions();
            (width, height, grayscale(panel.flushed_pixels()))
        });
        write_png(path.as_ref(), width, height, &data)
    }

    /// Save the last flushed secondary frame to a PNG.
    pub fn save_secondary_png(&self, path: impl AsRef<Path>) -> Result<(), String> {
        let panel = self
            .shell
            .secondary()
            .ok_or_else(|| "no secondary panel".to_string())?;
        let (width, height) = panel.dimensions();
        write_png(path.as_ref(), width, height, &grayscale(panel.flushed_pixels()))
    }
}

impl Default for ScenarioHarness {
    fn default() -> Self {
        Self::new()
    }
}

fn grayscale(pixels: &[BinaryColor]) -> Vec<u8> {
    pixels
        .iter()
        .map(|pixel| match pixel {
            BinaryColor::On => 255u8,
            BinaryColor::Off => 0u8,
        })
        .collect()
}

fn write_png(path: &Path, width: u32, height: u32, data: &[u8]) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }

    let file = File::create(path).map_err(|e| e.to_string())?;
    let writer = BufWriter::new(file);
    let mut encoder = Encoder::new(writer, width, height);
    encoder.set_color(ColorType::Grayscale);
    encoder.set_depth(BitDepth::Eight);
    let mut png_writer = encoder.write_header().map_err(|e| e.to_string())?;
    png_writer
        .write_image_data(data)
        .map_err(|e| e.to_string())
}
