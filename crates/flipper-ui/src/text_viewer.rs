//! Scrollable read-only text screen and the About app built on it.

use std::sync::Arc;

use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};

use crate::app_runner::{App, AppState};
use crate::filesystem::{FileSystem, FileSystemError};
use crate::input::{ControlState, InputHandle};
use crate::panel::Panel;
use crate::render_queue::RenderQueue;
use crate::text::{Metrics, TextCursor};

/// Longest stored line; longer lines wrap.
pub const MAX_LINE_CHARS: usize = 63;
/// Characters kept when a file is opened from the menu.
pub const MENU_FILE_LIMIT: usize = 4096;
pub const ABOUT_PATH: &str = "/assets/about.txt";

const TRUNCATED_MARKER: &str = "\n...(truncated)";

/// Shown when `/assets/about.txt` is missing or empty.
pub const DEFAULT_ABOUT_TEXT: &str = "Flipper Zero UI Clone\n\
Version: 1.0.0\n\
\n\
Built with PlatformIO\n\
for ESP32\n\
\n\
Displays:\n\
- SSD1306 OLED\n\
- Waveshare e-Paper\n\
\n\
Features:\n\
- File browser UI\n\
- Custom icons\n\
- Lua scripting\n\
\n\
Press button to exit";

/// Read up to `limit` displayable characters from `path`.
///
/// Control characters other than newline, tab and carriage return are
/// dropped. When the file holds more, a truncation marker is appended.
pub fn load_text(
    fs: &mut dyn FileSystem,
    path: &str,
    limit: usize,
) -> Result<String, FileSystemError> {
    let raw = fs.read_file(path)?;
    let mut chars = raw.chars();
    let mut text = String::with_capacity(raw.len().min(limit));
    let mut kept = 0;
    while kept < limit {
        let Some(c) = chars.next() else {
            break;
        };
        if c.is_ascii_graphic() || matches!(c, ' ' | '\n' | '\t' | '\r') {
            text.push(c);
            kept += 1;
        }
    }
    if chars.next().is_some() {
        text.push_str(TRUNCATED_MARKER);
    }
    Ok(text)
}

/// Split `content` into display lines at newlines and every
/// [`MAX_LINE_CHARS`] characters. A trailing newline adds no empty line.
pub fn wrap_lines(content: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut len = 0;
    for c in content.chars() {
        if c == '\n' {
            lines.push(std::mem::take(&mut current));
            len = 0;
            continue;
        }
        if len >= MAX_LINE_CHARS {
            lines.push(std::mem::take(&mut current));
            len = 0;
        }
        match c {
            '\r' => {}
            '\t' => current.push(' '),
            _ => current.push(c),
        }
        len += 1;
    }
    if len > 0 {
        lines.push(current);
    }
    lines
}

/// Title bar plus a scrolling page of lines.
#[derive(Debug, Clone)]
pub struct TextViewer {
    title: String,
    lines: Vec<String>,
    scroll: usize,
    needs_redraw: bool,
}

impl TextViewer {
    pub fn new(title: &str, content: &str) -> Self {
        Self {
            title: title.to_string(),
            lines: wrap_lines(content),
            scroll: 0,
            needs_redraw: true,
        }
    }

    /// Open `path`, or show a not-found note in its place.
    pub fn from_file(fs: &mut dyn FileSystem, title: &str, path: &str) -> Self {
        let content = match load_text(fs, path, MENU_FILE_LIMIT) {
            Ok(content) => content,
            Err(err) => {
                log::warn!("Cannot open {}: {}", path, err);
                format!("(File not found: {})", path)
            }
        };
        Self::new(title, &content)
    }

    /// The About screen, from storage if present.
    pub fn about(fs: &mut dyn FileSystem) -> Self {
        let content = match fs.read_file(ABOUT_PATH) {
            Ok(text) if !text.is_empty() => {
                log::info!("Loaded about text: {} bytes", text.len());
                text
            }
            _ => {
                log::info!("No {}, using built-in text", ABOUT_PATH);
                DEFAULT_ABOUT_TEXT.to_string()
            }
        };
        Self::new("About", &content)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    pub fn invalidate(&mut self) {
        self.needs_redraw = true;
    }

    /// Content rows on a surface of `height` pixels (one row is the title).
    pub fn visible_lines(height: u32, metrics: &Metrics) -> usize {
        (height / metrics.char_height).saturating_sub(1) as usize
    }

    /// Apply one frame of input for a page of `visible` lines.
    pub fn handle_input(&mut self, controls: &ControlState, visible: usize) -> AppState {
        if controls.button_released || controls.left {
            return AppState::Exit;
        }
        if controls.up && self.scroll > 0 {
            self.scroll -= 1;
            self.needs_redraw = true;
        }
        if controls.down && self.scroll < self.lines.len().saturating_sub(visible) {
            self.scroll += 1;
            self.needs_redraw = true;
        }
        AppState::Running
    }

    pub fn render<D>(&mut self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor> + OriginDimensions,
    {
        target.clear(BinaryColor::Off)?;
        let metrics = Metrics::of(target);
        let visible = Self::visible_lines(metrics.height, &metrics);
        let mut cursor = TextCursor::new(metrics);
        cursor.println(target, &self.title, true)?;
        for line in self.lines.iter().skip(self.scroll).take(visible) {
            cursor.println(target, line, false)?;
        }
        self.needs_redraw = false;
        Ok(())
    }
}

/// A [`TextViewer`] running as a foreground app on the shared panel.
pub struct TextViewerApp<P: Panel + 'static> {
    view: TextViewer,
    render: Arc<RenderQueue<P>>,
    input: InputHandle,
}

impl<P: Panel + 'static> TextViewerApp<P> {
    pub fn new(view: TextViewer, render: Arc<RenderQueue<P>>, input: InputHandle) -> Self {
        Self {
            view,
            render,
            input,
        }
    }

    pub fn view(&self) -> &TextViewer {
        &self.view
    }

    fn redraw(&mut self) {
        {
            let guard = self.render.lock().acquire();
            let mut panel = guard.panel();
            if let Err(err) = self.view.render(&mut *panel) {
                log::warn!("Text viewer draw failed: {:?}", err);
            }
        }
        self.render.request_refresh();
    }
}

impl<P: Panel + 'static> App for TextViewerApp<P> {
    fn poll(&mut self) -> AppState {
        let controls = self.input.current();
        let visible = {
            let size = self.render.lock().with(|panel| panel.size());
            TextViewer::visible_lines(size.height, &Metrics::for_size(size))
        };
        if self.view.handle_input(&controls, visible) == AppState::Exit {
            self.input.consume_button_release();
            return AppState::Exit;
        }
        if self.view.needs_redraw() {
            self.redraw();
        }
        AppState::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_filesystem::MockFileSystem;
    use crate::render_queue::RenderConfig;
    use crate::test_panel::TestPanel;

    fn press(f: impl FnOnce(&mut ControlState)) -> ControlState {
        let mut state = ControlState::default();
        f(&mut state);
        state
    }

    #[test]
    fn wraps_long_lines_and_keeps_blank_ones() {
        let long = "x".repeat(70);
        let lines = wrap_lines(&format!("a\n\n{}\nb\n", long));
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[1], "");
        assert_eq!(lines[2].len(), 63);
        assert_eq!(lines[3].len(), 7);
        assert_eq!(lines[4], "b");
        assert_eq!(wrap_lines("tab\there\r"), vec!["tab here"]);
    }

    #[test]
    fn load_filters_and_truncates() {
        let mut fs = MockFileSystem::new();
        fs.add_file("/big.txt", &"y".repeat(5000));
        fs.add_file("/ctl.txt", "ok\u{1}\u{7}!\n");

        let big = load_text(&mut fs, "/big.txt", MENU_FILE_LIMIT).unwrap();
        assert!(big.ends_with(TRUNCATED_MARKER));
        assert_eq!(big.len(), 4096 + TRUNCATED_MARKER.len());
        assert_eq!(load_text(&mut fs, "/ctl.txt", 10).unwrap(), "ok!\n");
        assert_eq!(
            load_text(&mut fs, "/missing", 10),
            Err(FileSystemError::NotFound)
        );
    }

    #[test]
    fn missing_file_shows_note() {
        let mut fs = MockFileSystem::new();
        let view = TextViewer::from_file(&mut fs, "Notes", "/nope.txt");
        assert_eq!(view.lines(), ["(File not found: /nope.txt)"]);
    }

    #[test]
    fn about_falls_back_to_builtin_text() {
        let mut fs = MockFileSystem::new();
        let view = TextViewer::about(&mut fs);
        assert_eq!(view.title(), "About");
        assert_eq!(view.lines()[0], "Flipper Zero UI Clone");
        assert_eq!(view.lines().last().map(String::as_str), Some("Press button to exit"));

        fs.add_file(ABOUT_PATH, "Custom\n");
        assert_eq!(TextViewer::about(&mut fs).lines(), ["Custom"]);
    }

    #[test]
    fn scrolling_is_bounded() {
        let content = (0..10).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
        let mut view = TextViewer::new("T", &content);
        let up = press(|s| s.up = true);
        let down = press(|s| s.down = true);

        view.handle_input(&up, 7);
        assert_eq!(view.scroll(), 0);
        for _ in 0..5 {
            view.handle_input(&down, 7);
        }
        assert_eq!(view.scroll(), 3);
        view.handle_input(&up, 7);
        assert_eq!(view.scroll(), 2);
    }

    #[test]
    fn release_or_left_exits() {
        let mut view = TextViewer::new("T", "body");
        assert_eq!(view.handle_input(&ControlState::default(), 7), AppState::Running);
        assert_eq!(view.handle_input(&press(|s| s.left = true), 7), AppState::Exit);
        assert_eq!(
            view.handle_input(&press(|s| s.button_released = true), 7),
            AppState::Exit
        );
    }

    #[test]
    fn app_redraws_only_when_needed() {
        let config = RenderConfig {
            queue_depth: 0,
            ..RenderConfig::default()
        };
        let render = Arc::new(RenderQueue::new(TestPanel::oled(), config));
        let input = InputHandle::new();
        let mut app = TextViewerApp::new(
            TextViewer::new("Title", "line one\nline two"),
            Arc::clone(&render),
            input.clone(),
        );
        let flushes = || render.lock().with(|panel| panel.flush_count());

        assert_eq!(app.poll(), AppState::Running);
        assert_eq!(flushes(), 1);
        render.lock().with(|panel| {
            // Inverted title bar across the top row.
            assert!(panel.lit_pixels_in_rows(0, 8) > 128 * 8 / 2);
            assert!(panel.lit_pixels_in_rows(8, 8) > 0);
        });

        assert_eq!(app.poll(), AppState::Running);
        assert_eq!(flushes(), 1);

        input.publish(press(|s| s.button_released = true));
        assert_eq!(app.poll(), AppState::Exit);
        assert!(!input.current().button_released);
    }
}
