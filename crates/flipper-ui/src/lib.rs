//! Flipper-style launcher UI for small monochrome panels.
//! Runs on ESP32 (OLED, e-paper or both) and on the host for tests.

#![forbid(unsafe_code)]
#![cfg_attr(
    not(test),
    deny(
        clippy::expect_used,
        clippy::panic,
        clippy::todo,
        clippy::unimplemented,
        clippy::unreachable,
        clippy::unwrap_used
    )
)]

pub mod app_runner;
pub mod debounce;
pub mod display_lock;
pub mod entries;
pub mod file_explorer;
pub mod filesystem;
pub mod icons;
pub mod input;
pub mod launcher;
pub mod loading;
pub mod menu;
pub mod mock_filesystem;
pub mod panel;
pub mod render_queue;
pub mod shell;
pub mod test_panel;
pub mod text;
pub mod text_viewer;

pub use app_runner::{App, AppRunner, AppState};
pub use debounce::SecondaryDebounce;
pub use display_lock::{DisplayGuard, DisplayLock};
pub use filesystem::{FileInfo, FileSystem, FileSystemError, SharedFileSystem};
pub use input::{ControlState, Controls, InputHandle, JoystickConfig, JoystickSample, JoystickSource};
pub use launcher::{AppRegistry, LaunchContext};
pub use panel::{Panel, StatusIndicator};
pub use render_queue::{ColorMode, DisplayMode, RenderConfig, RenderQueue};
pub use shell::Shell;
